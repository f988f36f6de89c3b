//! Batch Image Common Library
//!
//! CLIと各種フロントエンドで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod parser;
pub mod naming;

pub use types::{Prompt, Resolution, FailureRecord};
pub use error::{Error, Result};
pub use parser::{parse_prompts, validate_request, compose_prompt, prompt_preview, PREVIEW_CHARS};
pub use naming::{image_file_name, archive_file_name, parse_image_index};
