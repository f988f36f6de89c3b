//! ファイル名の規則
//!
//! 画像は `{index:03}.png`、アーカイブは `images_{first:03}-{last:03}.zip`

/// 画像ファイル名（例: 7 → `007.png`）
pub fn image_file_name(index: u32) -> String {
    format!("{:03}.png", index)
}

/// アーカイブファイル名（例: 1, 90 → `images_001-090.zip`）
pub fn archive_file_name(first: u32, last: u32) -> String {
    format!("images_{:03}-{:03}.zip", first, last)
}

/// `007.png` 形式のファイル名から番号を取り出す
///
/// 数字のみのステムと `.png` 拡張子（大文字小文字を問わない）に一致しない場合は `None`。
pub fn parse_image_index(file_name: &str) -> Option<u32> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if !ext.eq_ignore_ascii_case("png") {
        return None;
    }
    if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok().filter(|&n| n > 0)
}
