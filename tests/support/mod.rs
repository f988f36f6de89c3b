//! テスト用の生成クライアントと画像ヘルパー

#![allow(dead_code)]

use async_trait::async_trait;
use gemini_batch_image::batch::Pacing;
use gemini_batch_image::error::{BatchImageError, Result};
use gemini_batch_image::generator::ImageGenerator;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imagegen_common::Resolution;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 1回の呼び出しに対する応答
pub enum Step {
    Image(Vec<u8>),
    NoImage,
    Fail(&'static str),
    /// 応答を返さない（キャンセル待ち）
    Hang,
    /// 画像を返す直前にキャンセルを要求する
    CancelThenImage(CancellationToken, Vec<u8>),
}

/// 台本どおりに応答する生成クライアント
///
/// 台本を使い切った後は画像なしを返す。
pub struct ScriptedGenerator {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(String, Resolution)>>,
}

impl ScriptedGenerator {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 送信されたプロンプト全文（呼び出し順）
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn resolutions(&self) -> Vec<Resolution> {
        self.calls.lock().unwrap().iter().map(|(_, r)| *r).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _credential: &str,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Option<Vec<u8>>> {
        self.calls.lock().unwrap().push((prompt.to_string(), resolution));
        let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::NoImage);

        match step {
            Step::Image(bytes) => Ok(Some(bytes)),
            Step::NoImage => Ok(None),
            Step::Fail(message) => Err(BatchImageError::Provider(message.to_string())),
            Step::CancelThenImage(token, bytes) => {
                token.cancel();
                Ok(Some(bytes))
            }
            Step::Hang => {
                std::future::pending::<()>().await;
                Ok(None)
            }
        }
    }
}

/// 単色のRGBA PNG
pub fn rgba_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// テスト用の短い待機設定
pub fn fast_pacing() -> Pacing {
    Pacing {
        delay: Duration::from_millis(20),
        tick: Duration::from_millis(5),
    }
}
