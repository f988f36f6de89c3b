//! 実行結果サマリー（summary.json）

use crate::batch::{BatchState, BatchStatus};
use crate::error::Result;
use imagegen_common::{image_file_name, FailureRecord, Resolution};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

pub const SUMMARY_FILE_NAME: &str = "summary.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub generated_at: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub resolution: Resolution,
    pub style: String,
    pub total: usize,
    pub images: Vec<SummaryImage>,
    pub failures: Vec<FailureRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryImage {
    pub index: u32,
    pub prompt: String,
    pub file: String,
    pub sha256: String,
}

impl RunSummary {
    pub fn from_state(state: &BatchState) -> Self {
        let images = state
            .results
            .values()
            .map(|image| SummaryImage {
                index: image.index,
                prompt: image.prompt_text.clone(),
                file: image_file_name(image.index),
                sha256: hex::encode(Sha256::digest(&image.byte_content)),
            })
            .collect();

        let error = match &state.status {
            BatchStatus::Failed(reason) => Some(reason.clone()),
            _ => None,
        };

        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            status: state.status.label().to_string(),
            error,
            resolution: state.resolution,
            style: state.style.clone(),
            total: state.total(),
            images,
            failures: state.failures.clone(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
