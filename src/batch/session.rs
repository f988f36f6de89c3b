//! セッション単位のバッチ管理
//!
//! 同時に実行できるバッチは1つだけ。フロントエンドは `start` で開始し、
//! `snapshot` / `subscribe` で進捗を読み、`request_cancel` で中断を要求する。

use super::progress::{ProgressEvent, ProgressSink, ProgressSnapshot};
use super::runner::BatchRunner;
use super::state::BatchState;
use crate::archive;
use crate::error::{BatchImageError, Result};
use crate::generator::ImageGenerator;
use imagegen_common::{parse_prompts, validate_request, Resolution};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 画像の保存先（セッション専用の一時フォルダまたは指定フォルダ）
enum SessionStorage {
    Temp(TempDir),
    Dir(PathBuf),
}

impl SessionStorage {
    fn root(&self) -> &Path {
        match self {
            SessionStorage::Temp(dir) => dir.path(),
            SessionStorage::Dir(path) => path,
        }
    }
}

/// 実行中フラグを確実に下ろす
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 開始したバッチへのハンドル
pub struct BatchHandle {
    pub events: mpsc::UnboundedReceiver<ProgressEvent>,
    pub task: JoinHandle<BatchState>,
}

impl BatchHandle {
    /// 終了を待って最終状態を返す（イベントは読み捨てる）
    pub async fn wait(self) -> Result<BatchState> {
        self.task
            .await
            .map_err(|e| BatchImageError::TaskFailed(e.to_string()))
    }
}

pub struct BatchSession<G: ?Sized> {
    runner: Arc<BatchRunner<G>>,
    storage: SessionStorage,
    running: Arc<AtomicBool>,
    run_counter: AtomicU32,
    cancel: Mutex<CancellationToken>,
    snapshot: Arc<watch::Sender<ProgressSnapshot>>,
}

impl<G: ImageGenerator + ?Sized + 'static> BatchSession<G> {
    /// セッション専用の一時フォルダを保存先にする（セッション破棄時に削除）
    pub fn new(runner: BatchRunner<G>) -> Result<Self> {
        let temp = tempfile::Builder::new().prefix("gemini-batch-").tempdir()?;
        Ok(Self::with_storage(runner, SessionStorage::Temp(temp)))
    }

    /// 指定フォルダを保存先にする（破棄時も残す）
    pub fn with_storage_dir(runner: BatchRunner<G>, dir: impl Into<PathBuf>) -> Self {
        Self::with_storage(runner, SessionStorage::Dir(dir.into()))
    }

    fn with_storage(runner: BatchRunner<G>, storage: SessionStorage) -> Self {
        let (snapshot, _) = watch::channel(ProgressSnapshot::default());
        Self {
            runner: Arc::new(runner),
            storage,
            running: Arc::new(AtomicBool::new(false)),
            run_counter: AtomicU32::new(0),
            cancel: Mutex::new(CancellationToken::new()),
            snapshot: Arc::new(snapshot),
        }
    }

    pub fn storage_root(&self) -> &Path {
        self.storage.root()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// バッチを開始する
    ///
    /// 入力検証に失敗した場合や、既に実行中の場合は何もせずにエラーを返す。
    /// tokioランタイム上で呼び出すこと。
    pub fn start(
        &self,
        credential: &str,
        prompts_raw: &str,
        style: &str,
        resolution: Resolution,
    ) -> Result<BatchHandle> {
        let prompts = parse_prompts(prompts_raw);
        validate_request(credential, &prompts)?;

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BatchImageError::AlreadyRunning);
        }
        let guard = RunningGuard(self.running.clone());

        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(|e| e.into_inner()) = token.clone();

        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ProgressSink::new()
            .with_events(tx)
            .with_snapshot(self.snapshot.clone());

        let storage_dir = self.next_run_dir();
        let state = BatchState::new(prompts, style.trim(), resolution);
        // 前回の終了状態を残さない
        self.snapshot.send_replace(state.snapshot());
        let runner = self.runner.clone();
        let credential = credential.trim().to_string();

        let task = tokio::spawn(async move {
            let _guard = guard;
            runner
                .run(&credential, state, &storage_dir, &token, &sink)
                .await
        });

        Ok(BatchHandle { events: rx, task })
    }

    /// 既存フォルダと重ならない `run-NNN` を選ぶ
    fn next_run_dir(&self) -> PathBuf {
        loop {
            let run_no = self.run_counter.fetch_add(1, Ordering::SeqCst) + 1;
            let dir = self.storage.root().join(format!("run-{:03}", run_no));
            if !dir.exists() {
                return dir;
            }
        }
    }

    /// `signal` がバッチ終了前に完了したら中断を要求する
    ///
    /// 中断を要求した場合は `true`、先にバッチが終了した場合は `false`。
    /// `start` の後に呼び出すこと。
    pub async fn cancel_on<F: Future>(&self, signal: F) -> bool {
        let mut snapshots = self.subscribe();
        tokio::select! {
            _ = signal => {
                self.request_cancel();
                true
            }
            _ = snapshots.wait_for(|s| s.state.is_finished()) => false,
        }
    }

    /// 実行中のバッチに中断を要求する（実行中でなければ何もしない）
    pub fn request_cancel(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.snapshot.subscribe()
    }

    /// 直近のバッチの成功画像をアーカイブとして保存する
    pub fn save_archive(&self, dest: &Path) -> Result<PathBuf> {
        archive::save_archive(&self.snapshot().latest_results, dest)
    }
}
