//! ZIPアーカイブ作成
//!
//! 成功画像を番号順に `{index:03}.png` として格納する。
//! 画像は保存先のファイルから読み込む。

use crate::batch::GeneratedImage;
use crate::error::{BatchImageError, Result};
use imagegen_common::{archive_file_name, image_file_name};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// 番号順に並べ替えた参照
fn sorted_by_index(images: &[GeneratedImage]) -> Vec<&GeneratedImage> {
    let mut sorted: Vec<&GeneratedImage> = images.iter().collect();
    sorted.sort_by_key(|image| image.index);
    sorted
}

/// デフォルトのアーカイブ名（例: `images_001-090.zip`）
pub fn default_archive_name(images: &[GeneratedImage]) -> Option<String> {
    let first = images.iter().map(|i| i.index).min()?;
    let last = images.iter().map(|i| i.index).max()?;
    Some(archive_file_name(first, last))
}

/// アーカイブを書き出す
///
/// 同じ結果集合からは同じエントリ名・同じ順序のアーカイブができる
/// （更新日時は固定値）。結果が空なら `EmptyResult`。
pub fn write_archive<W: Write + Seek>(images: &[GeneratedImage], writer: W) -> Result<W> {
    if images.is_empty() {
        return Err(BatchImageError::EmptyResult);
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(writer);
    for image in sorted_by_index(images) {
        let bytes = std::fs::read(&image.storage_path)?;
        zip.start_file(image_file_name(image.index), options)?;
        zip.write_all(&bytes)?;
    }

    Ok(zip.finish()?)
}

/// メモリ上にアーカイブを作成（ダウンロード配信用）
pub fn archive_to_vec(images: &[GeneratedImage]) -> Result<Vec<u8>> {
    let cursor = write_archive(images, Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}

/// アーカイブをファイルに保存
///
/// `dest` がフォルダ（または拡張子なし）ならデフォルト名で中に作る。
pub fn save_archive(images: &[GeneratedImage], dest: &Path) -> Result<PathBuf> {
    let path = archive_path(images, dest)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(&path)?;
    write_archive(images, std::io::BufWriter::new(file))?.flush()?;
    Ok(path)
}

/// 保存先パスを決定
pub fn archive_path(images: &[GeneratedImage], dest: &Path) -> Result<PathBuf> {
    if dest.is_dir() || dest.extension().is_none() {
        let name = default_archive_name(images).ok_or(BatchImageError::EmptyResult)?;
        Ok(dest.join(name))
    } else {
        Ok(dest.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fake(index: u32) -> GeneratedImage {
        GeneratedImage {
            index,
            prompt_text: String::new(),
            byte_content: Arc::from(Vec::new()),
            storage_path: PathBuf::from(format!("/tmp/{:03}.png", index)),
        }
    }

    #[test]
    fn test_default_archive_name_uses_index_range() {
        let images = vec![fake(3), fake(1), fake(90)];
        assert_eq!(default_archive_name(&images).as_deref(), Some("images_001-090.zip"));
        assert_eq!(default_archive_name(&[]), None);
    }

    #[test]
    fn test_sorted_by_index() {
        let images = vec![fake(3), fake(1), fake(2)];
        let order: Vec<u32> = sorted_by_index(&images).iter().map(|i| i.index).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_write_archive_empty() {
        let err = archive_to_vec(&[]).unwrap_err();
        assert!(matches!(err, BatchImageError::EmptyResult));
    }

    #[test]
    fn test_archive_path_for_file_and_dir() {
        let images = vec![fake(1), fake(2)];
        let as_file = archive_path(&images, Path::new("out/my.zip")).unwrap();
        assert_eq!(as_file, PathBuf::from("out/my.zip"));

        let as_dir = archive_path(&images, Path::new("out")).unwrap();
        assert_eq!(as_dir, PathBuf::from("out/images_001-002.zip"));
    }
}
