//! 進捗通知
//!
//! ランナーは試行ごとにイベントを送り、最新スナップショットを公開する。
//! 受信側がいなくてもランナーの動作には影響しない。

use super::state::{BatchState, BatchStatus, GeneratedImage};
use imagegen_common::FailureRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Saved { file_name: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { total: usize },
    /// 1件の試行が終わった（成功・失敗とも）
    Attempted {
        index: u32,
        total: usize,
        preview: String,
        outcome: AttemptOutcome,
    },
    /// 次のリクエストまでの待機中（tickごと）
    Waiting { next_index: u32, remaining: Duration },
    Finished { status: BatchStatus },
}

/// フロントエンドがポーリングする状態の写し
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub current_index: Option<u32>,
    pub latest_results: Vec<GeneratedImage>,
    pub latest_failures: Vec<FailureRecord>,
    pub state: BatchStatus,
}

#[derive(Clone, Default)]
pub struct ProgressSink {
    events: Option<mpsc::UnboundedSender<ProgressEvent>>,
    snapshot: Option<Arc<watch::Sender<ProgressSnapshot>>>,
}

impl ProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn with_snapshot(mut self, tx: Arc<watch::Sender<ProgressSnapshot>>) -> Self {
        self.snapshot = Some(tx);
        self
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.events {
            // 受信側が閉じていても無視
            let _ = tx.send(event);
        }
    }

    pub(crate) fn publish(&self, state: &BatchState) {
        if let Some(tx) = &self.snapshot {
            tx.send_replace(state.snapshot());
        }
    }
}
