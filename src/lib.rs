//! Gemini batch image generator
//!
//! プロンプト一覧を1件ずつ（レート制限に合わせて待機しながら）画像生成APIへ送り、
//! RGB PNGに正規化して保存し、成功分をZIPにまとめる。

pub mod archive;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod normalizer;
pub mod scanner;
pub mod summary;
