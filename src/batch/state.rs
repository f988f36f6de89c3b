//! バッチ状態（値オブジェクト）
//!
//! ランナーに渡され、ランナーから返される。フロントエンドはスナップショットのみを読む。

use super::progress::ProgressSnapshot;
use imagegen_common::{FailureRecord, Prompt, Resolution};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// 正規化・保存済みの生成画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub index: u32,
    pub prompt_text: String,
    /// RGB PNG
    pub byte_content: Arc<[u8]>,
    pub storage_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BatchStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    /// 続行不能なエラー（保存先を用意できない等）
    Failed(String),
}

impl BatchStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            BatchStatus::Completed | BatchStatus::Cancelled | BatchStatus::Failed(_)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            BatchStatus::Idle => "idle",
            BatchStatus::Running => "running",
            BatchStatus::Completed => "completed",
            BatchStatus::Cancelled => "cancelled",
            BatchStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchState {
    pub prompts: Vec<Prompt>,
    pub resolution: Resolution,
    pub style: String,
    /// 番号をキーにした成功結果（1番号につき最大1件）
    pub results: BTreeMap<u32, GeneratedImage>,
    pub failures: Vec<FailureRecord>,
    /// 次に処理する番号（1始まり）
    pub cursor: u32,
    pub status: BatchStatus,
}

impl BatchState {
    pub fn new(prompts: Vec<Prompt>, style: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            prompts,
            resolution,
            style: style.into(),
            results: BTreeMap::new(),
            failures: Vec::new(),
            cursor: 1,
            status: BatchStatus::Idle,
        }
    }

    pub fn total(&self) -> usize {
        self.prompts.len()
    }

    /// 処理済み件数（成功 + 失敗）
    pub fn completed(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// カーソル位置の未処理プロンプト
    pub fn next_prompt(&self) -> Option<&Prompt> {
        self.prompts.get(self.cursor as usize - 1)
    }

    /// 番号順の成功結果
    pub fn images(&self) -> Vec<GeneratedImage> {
        self.results.values().cloned().collect()
    }

    pub(crate) fn record_success(&mut self, image: GeneratedImage) {
        debug_assert_eq!(image.index, self.cursor);
        debug_assert!(!self.results.contains_key(&image.index));
        self.results.insert(image.index, image);
        self.cursor += 1;
    }

    pub(crate) fn record_failure(&mut self, record: FailureRecord) {
        debug_assert_eq!(record.index, self.cursor);
        self.failures.push(record);
        self.cursor += 1;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let current_index = self.next_prompt().map(|p| p.index);
        ProgressSnapshot {
            completed: self.completed(),
            total: self.total(),
            current_index,
            latest_results: self.images(),
            latest_failures: self.failures.clone(),
            state: self.status.clone(),
        }
    }
}
