//! Gemini API連携（画像生成）

use super::ImageGenerator;
use crate::config::Config;
use crate::error::{BatchImageError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use imagegen_common::Resolution;
use serde::{Deserialize, Serialize};

/// Gemini APIリクエスト
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: [&'static str; 2],
    image_config: ImageConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    image_size: &'static str,
}

/// Gemini APIレスポンス
#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ResponsePart {
    #[serde(alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: InlinePayload,
}

/// 画像データは通常Base64文字列だが、バイト配列で返る場合も受け付ける
#[derive(Deserialize)]
#[serde(untagged)]
enum InlinePayload {
    Base64(String),
    Bytes(Vec<u8>),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BatchImageError::Config(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

fn build_request(prompt: &str, resolution: Resolution) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![TextPart { text: prompt }],
        }],
        generation_config: GenerationConfig {
            response_modalities: ["TEXT", "IMAGE"],
            image_config: ImageConfig {
                image_size: resolution.as_str(),
            },
        },
    }
}

/// エラーレスポンス本文から人が読めるメッセージを取り出す
fn provider_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(300).collect());
    format!("API error {}: {}", status.as_u16(), detail.trim())
}

/// レスポンスJSONから最初のインライン画像を取り出す
///
/// 候補・パートを順に走査し、最初に画像データを持つパートを返す。
/// Base64文字列（data URL形式を含む）は自動でデコードする。
pub fn extract_first_image(payload: &serde_json::Value) -> Result<Option<Vec<u8>>> {
    let response: GenerateResponse = serde_json::from_value(payload.clone())
        .map_err(|e| BatchImageError::Provider(format!("レスポンスのパースに失敗: {}", e)))?;

    let first = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.inline_data)
        .find(|inline| match &inline.data {
            InlinePayload::Base64(s) => !s.is_empty(),
            InlinePayload::Bytes(b) => !b.is_empty(),
        });

    match first.map(|inline| inline.data) {
        None => Ok(None),
        Some(InlinePayload::Bytes(bytes)) => Ok(Some(bytes)),
        Some(InlinePayload::Base64(encoded)) => {
            let encoded = match encoded.split_once(";base64,") {
                Some((_, data)) => data,
                None => encoded.as_str(),
            };
            BASE64
                .decode(encoded.trim())
                .map(Some)
                .map_err(|e| BatchImageError::Decode(format!("Base64デコード失敗: {}", e)))
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        resolution: Resolution,
    ) -> Result<Option<Vec<u8>>> {
        let endpoint = self.endpoint();
        log::debug!("POST {} (imageSize={})", endpoint, resolution);

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", credential)
            .json(&build_request(prompt, resolution))
            .send()
            .await
            .map_err(|e| BatchImageError::Provider(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BatchImageError::Provider(format!("response read failed: {}", e)))?;

        if !status.is_success() {
            return Err(BatchImageError::Provider(provider_error_message(status, &body)));
        }

        let payload: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| BatchImageError::Provider(format!("レスポンスのパースに失敗: {}", e)))?;
        extract_first_image(&payload)
    }
}
