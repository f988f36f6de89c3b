use crate::error::{BatchImageError, Result};
use imagegen_common::Resolution;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 永続設定
///
/// APIキーはここには保存しない（セッション中のメモリにのみ保持する）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub api_base: String,
    /// リクエスト間の待機秒数
    pub delay_seconds: u64,
    /// 待機中にキャンセルを確認する間隔
    pub tick_millis: u64,
    pub timeout_seconds: u64,
    pub default_resolution: Resolution,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            delay_seconds: 60,  // レート制限: 1リクエスト/分
            tick_millis: 1000,
            timeout_seconds: 300,
            default_resolution: Resolution::OneK,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BatchImageError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("gemini-batch").join("config.json"))
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_seconds)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// APIキーを解決する
    ///
    /// 優先順位: 引数 → GEMINI_API_KEY → GOOGLE_API_KEY
    pub fn resolve_api_key(explicit: Option<&str>) -> Result<String> {
        let from_env = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        explicit
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| from_env("GEMINI_API_KEY"))
            .or_else(|| from_env("GOOGLE_API_KEY"))
            .ok_or(BatchImageError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.delay(), Duration::from_secs(60));
        assert_eq!(config.tick(), Duration::from_secs(1));
        assert_eq!(config.default_resolution, Resolution::OneK);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"delay_seconds": 5}"#).unwrap();
        assert_eq!(config.delay_seconds, 5);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.tick_millis, 1000);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let config = Config { tick_millis: 0, ..Default::default() };
        assert_eq!(config.tick(), Duration::from_millis(1));
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit() {
        let key = Config::resolve_api_key(Some("  explicit-key ")).unwrap();
        assert_eq!(key, "explicit-key");
    }
}
