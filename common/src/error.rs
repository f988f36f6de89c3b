//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// `MissingCredential` と `EmptyPrompts` はバッチ開始前の事前条件違反で、
/// 外部呼び出しは一切行われない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("APIキーが入力されていません")]
    MissingCredential,

    #[error("有効なプロンプトがありません")]
    EmptyPrompts,

    #[error("不明な解像度: {0}（1K / 2K / 4K のいずれかを指定してください）")]
    InvalidResolution(String),
}

impl Error {
    /// バッチ開始前の入力検証エラーかどうか
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::MissingCredential | Error::EmptyPrompts)
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
