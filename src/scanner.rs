//! 生成済みフォルダのスキャン
//!
//! `001.png` 形式の画像を集め、再アーカイブ用の結果一覧を作る。

use crate::batch::GeneratedImage;
use crate::error::{BatchImageError, Result};
use imagegen_common::parse_image_index;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

pub fn scan_generated_folder(folder: &Path) -> Result<Vec<GeneratedImage>> {
    if !folder.is_dir() {
        return Err(BatchImageError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let Some(index) = parse_image_index(&file_name) else {
            continue;
        };

        let bytes = std::fs::read(path)?;
        images.push(GeneratedImage {
            index,
            prompt_text: String::new(),
            byte_content: Arc::from(bytes),
            storage_path: path.to_path_buf(),
        });
    }

    images.sort_by_key(|image| image.index);
    // `7.png` と `007.png` が並存する場合は先の1件のみ
    images.dedup_by_key(|image| image.index);

    Ok(images)
}
