//! バッチランナー
//!
//! プロンプトを番号順に1件ずつ処理する（並列化しない）。
//! 生成 → 正規化 → 保存 → 成否の記録 → 待機、を繰り返す。
//! キャンセルは呼び出し前・呼び出し中・待機中のいずれでも受け付ける。

use super::progress::{AttemptOutcome, ProgressEvent, ProgressSink};
use super::state::{BatchState, BatchStatus, GeneratedImage};
use crate::config::Config;
use crate::error::{BatchImageError, Result};
use crate::generator::ImageGenerator;
use crate::normalizer::normalize_to_rgb_png;
use imagegen_common::{
    compose_prompt, image_file_name, prompt_preview, FailureRecord, Prompt, PREVIEW_CHARS,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// リクエスト間の待機設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// 次のリクエストまでの待機時間
    pub delay: Duration,
    /// 待機中のキャンセル確認・進捗通知の間隔
    pub tick: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(60),
            tick: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delay: config.delay(),
            tick: config.tick(),
        }
    }
}

pub struct BatchRunner<G: ?Sized> {
    generator: Arc<G>,
    pacing: Pacing,
}

impl<G: ImageGenerator + ?Sized> BatchRunner<G> {
    pub fn new(generator: Arc<G>, pacing: Pacing) -> Self {
        Self { generator, pacing }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// バッチを最後まで（またはキャンセルまで）実行し、最終状態を返す
    ///
    /// 個々のプロンプトの失敗は `FailureRecord` として記録し、バッチは止めない。
    pub async fn run(
        &self,
        credential: &str,
        mut state: BatchState,
        storage_dir: &Path,
        cancel: &CancellationToken,
        sink: &ProgressSink,
    ) -> BatchState {
        let total = state.total();
        state.status = BatchStatus::Running;
        sink.emit(ProgressEvent::Started { total });
        sink.publish(&state);
        log::info!("バッチ開始: {}件 (解像度 {})", total, state.resolution);

        if let Err(e) = tokio::fs::create_dir_all(storage_dir).await {
            log::error!("保存先を作成できません {}: {}", storage_dir.display(), e);
            state.status = BatchStatus::Failed(format!(
                "保存先を作成できません {}: {}",
                storage_dir.display(),
                e
            ));
            return finish(state, sink);
        }

        while let Some(prompt) = state.next_prompt().cloned() {
            if cancel.is_cancelled() {
                state.status = BatchStatus::Cancelled;
                break;
            }

            let full_prompt = compose_prompt(&prompt.text, &state.style);
            let generated = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.generator.generate(credential, &full_prompt, state.resolution) => Some(result),
            };

            // 呼び出し中のキャンセルは未試行扱い（カーソルを進めない）
            let Some(generated) = generated else {
                log::info!("[{}/{}] 呼び出し中にキャンセル", prompt.index, total);
                state.status = BatchStatus::Cancelled;
                break;
            };

            // 応答を受け取った後は保存と記録まで必ず終える
            let result = match generated {
                Ok(payload) => self.persist(&prompt, payload, storage_dir).await,
                Err(e) => Err(e),
            };

            let outcome = match result {
                Ok(image) => {
                    let file_name = image_file_name(image.index);
                    log::info!("[{}/{}] 保存完了: {}", prompt.index, total, file_name);
                    state.record_success(image);
                    AttemptOutcome::Saved { file_name }
                }
                Err(e) => {
                    let reason = e.to_string();
                    log::warn!("[{}/{}] 失敗: {}", prompt.index, total, reason);
                    state.record_failure(FailureRecord {
                        index: prompt.index,
                        prompt_text: prompt.text.clone(),
                        reason: reason.clone(),
                    });
                    AttemptOutcome::Failed { reason }
                }
            };

            sink.emit(ProgressEvent::Attempted {
                index: prompt.index,
                total,
                preview: prompt_preview(&prompt.text, PREVIEW_CHARS),
                outcome,
            });
            sink.publish(&state);

            if let Some(next) = state.next_prompt().map(|p| p.index) {
                if !self.pause(next, cancel, sink).await {
                    state.status = BatchStatus::Cancelled;
                    break;
                }
            }
        }

        if state.status == BatchStatus::Running {
            state.status = BatchStatus::Completed;
        }
        log::info!(
            "バッチ終了 ({}): {}/{}件成功",
            state.status.label(),
            state.results.len(),
            total
        );
        finish(state, sink)
    }

    /// 受け取った画像の正規化・保存
    async fn persist(
        &self,
        prompt: &Prompt,
        payload: Option<Vec<u8>>,
        storage_dir: &Path,
    ) -> Result<GeneratedImage> {
        let payload = payload.ok_or(BatchImageError::NoImage)?;

        let png = normalize_to_rgb_png(&payload)?;
        let storage_path = storage_dir.join(image_file_name(prompt.index));
        tokio::fs::write(&storage_path, &png).await?;

        Ok(GeneratedImage {
            index: prompt.index,
            prompt_text: prompt.text.clone(),
            byte_content: Arc::from(png),
            storage_path,
        })
    }

    /// 次のリクエストまで待機する。キャンセルされたら `false`
    async fn pause(&self, next_index: u32, cancel: &CancellationToken, sink: &ProgressSink) -> bool {
        let mut remaining = self.pacing.delay;
        let tick = self.pacing.tick.max(Duration::from_millis(1));
        log::debug!("{:?} 待機 (次: {})", remaining, next_index);

        while !remaining.is_zero() {
            if cancel.is_cancelled() {
                return false;
            }
            sink.emit(ProgressEvent::Waiting { next_index, remaining });

            let step = remaining.min(tick);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(step) => {}
            }
            remaining = remaining.saturating_sub(step);
        }

        !cancel.is_cancelled()
    }
}

fn finish(state: BatchState, sink: &ProgressSink) -> BatchState {
    sink.emit(ProgressEvent::Finished {
        status: state.status.clone(),
    });
    sink.publish(&state);
    state
}
