//! バッチ生成の型定義
//!
//! CLIとフロントエンドで共有される型:
//! - Prompt: 入力1行分のプロンプト（1始まりの番号付き）
//! - Resolution: プロバイダに要求する解像度区分
//! - FailureRecord: 生成に失敗したプロンプトの記録

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 入力プロンプト
///
/// パース時に一度だけ作られ、以後変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// 1始まりの連番
    pub index: u32,
    /// 前後の空白を除去済みの本文（空にはならない）
    pub text: String,
}

/// 出力解像度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// 1024px相当
    #[default]
    #[serde(rename = "1K")]
    OneK,
    /// 2048px相当
    #[serde(rename = "2K")]
    TwoK,
    /// 4096px相当
    #[serde(rename = "4K")]
    FourK,
}

impl Resolution {
    pub const ALL: [Resolution; 3] = [Resolution::OneK, Resolution::TwoK, Resolution::FourK];

    /// APIの `imageSize` に渡す値
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::OneK => "1K",
            Resolution::TwoK => "2K",
            Resolution::FourK => "4K",
        }
    }

    /// 一辺のおおよそのピクセル数
    pub fn approx_pixels(&self) -> u32 {
        match self {
            Resolution::OneK => 1024,
            Resolution::TwoK => 2048,
            Resolution::FourK => 4096,
        }
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1K" => Ok(Resolution::OneK),
            "2K" => Ok(Resolution::TwoK),
            "4K" => Ok(Resolution::FourK),
            _ => Err(Error::InvalidResolution(s.to_string())),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 失敗記録（追記のみ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub index: u32,
    pub prompt_text: String,
    pub reason: String,
}
