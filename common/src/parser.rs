//! プロンプトパーサー
//!
//! 複数行の入力をプロンプト列に分解し、共通スタイルを付加する

use crate::error::{Error, Result};
use crate::types::Prompt;

/// 進捗表示で使うプレビューの文字数
pub const PREVIEW_CHARS: usize = 40;

/// 複数行テキストをプロンプト列に変換
///
/// 各行をトリムし、空行を除外し、元の順序のまま1始まりの番号を振る。
///
/// # Examples
/// ```
/// use imagegen_common::parse_prompts;
///
/// let prompts = parse_prompts("春の公園\n\n  秋の山  \n");
/// assert_eq!(prompts.len(), 2);
/// assert_eq!(prompts[1].index, 2);
/// assert_eq!(prompts[1].text, "秋の山");
/// ```
pub fn parse_prompts(raw: &str) -> Vec<Prompt> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, text)| Prompt {
            index: i as u32 + 1,
            text: text.to_string(),
        })
        .collect()
}

/// バッチ開始前の事前条件チェック
///
/// APIキーを先に検査する。
pub fn validate_request(credential: &str, prompts: &[Prompt]) -> Result<()> {
    if credential.trim().is_empty() {
        return Err(Error::MissingCredential);
    }
    if prompts.is_empty() {
        return Err(Error::EmptyPrompts);
    }
    Ok(())
}

/// 送信用のプロンプト全文を組み立てる
///
/// スタイルが空（空白のみを含む）なら本文をそのまま返す。
pub fn compose_prompt(text: &str, style: &str) -> String {
    let style = style.trim();
    if style.is_empty() {
        text.to_string()
    } else {
        format!("{}, {}", text, style)
    }
}

/// 進捗表示用に先頭 `max_chars` 文字へ切り詰める
pub fn prompt_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}
