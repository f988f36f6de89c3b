//! 画像生成クライアント
//!
//! 外部の画像生成APIとのやり取りをこのトレイトの背後に閉じ込める。

mod gemini;

pub use gemini::{extract_first_image, GeminiClient};

use crate::error::Result;
use async_trait::async_trait;
use imagegen_common::Resolution;

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// 1回だけリモート呼び出しを行い、最初の画像データを返す
    ///
    /// 応答に画像が含まれなければ `Ok(None)`。
    /// 通信・認証・プロバイダ側の失敗は `BatchImageError::Provider`。
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Option<Vec<u8>>>;
}
