use log::{info, warn};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

/// 刪除目錄中（不含子目錄）修改時間超過 `max_age` 的檔案，回傳刪除數量
///
/// 目錄不存在時視為沒有可清理的檔案。
pub fn sweep_stale_files(directory: &Path, max_age: Duration) -> usize {
    if !directory.is_dir() {
        return 0;
    }

    let now = SystemTime::now();
    let stale_files: Vec<_> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .metadata()
                .ok()
                .and_then(|meta| meta.modified().ok())
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age >= max_age)
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    let mut removed = 0;
    for path in stale_files {
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("已清除過期暫存檔: {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("無法清除過期暫存檔 {}: {e}", path.display()),
        }
    }
    removed
}
