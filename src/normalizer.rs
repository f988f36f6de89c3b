//! 画像正規化モジュール
//!
//! プロバイダから返った画像を不透明なRGB PNGに揃える。
//! - アルファ付き: 白背景にアルファ合成
//! - RGB: そのまま
//! - その他（グレースケール等）: RGBへ変換

use crate::error::{BatchImageError, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use std::io::Cursor;

/// 画像バイト列を RGB PNG に正規化
pub fn normalize_to_rgb_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| BatchImageError::Decode(e.to_string()))?;
    encode_png(to_opaque_rgb(decoded))
}

/// 色モードに応じて不透明なRGB画像に変換
pub fn to_opaque_rgb(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other if other.color().has_alpha() => composite_on_white(&other.to_rgba8()),
        other => other.to_rgb8(),
    }
}

/// アルファをマスクとして白背景に合成
pub fn composite_on_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([blend_white(r, a), blend_white(g, a), blend_white(b, a)])
    })
}

fn blend_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + 255 * (255 - a) + 127) / 255) as u8
}

fn encode_png(rgb: RgbImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| BatchImageError::Decode(format!("PNGエンコード失敗: {}", e)))?;
    Ok(out.into_inner())
}
