use super::error::FileSystemFailure;
use crate::tools::sweep_stale_files;
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// 名稱碰撞時的重試上限（`create_new` 失敗才會重試）
const MAX_ALLOCATE_ATTEMPTS: usize = 4;

/// 暫存畫面檔案管理
///
/// 每次配置都以 `create_new` 佔用一個唯一檔名，因此同時進行的擷取不會共用路徑，
/// 也不需要任何鎖。
#[derive(Debug, Clone)]
pub struct TempFileManager {
    directory: PathBuf,
}

impl TempFileManager {
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, FileSystemFailure> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(FileSystemFailure::AllocationFailed)?;
        Ok(Self { directory })
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 配置一個新的輸出路徑，檔案會先以空檔案形式建立
    pub fn allocate(&self, extension: &str) -> Result<PathBuf, FileSystemFailure> {
        fs::create_dir_all(&self.directory).map_err(FileSystemFailure::AllocationFailed)?;

        let mut last_error = None;
        for _ in 0..MAX_ALLOCATE_ATTEMPTS {
            let path = self
                .directory
                .join(format!("frame_{}.{extension}", Uuid::new_v4().simple()));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    debug!("已配置暫存檔: {}", path.display());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => last_error = Some(e),
                Err(e) => return Err(FileSystemFailure::AllocationFailed(e)),
            }
        }

        Err(FileSystemFailure::AllocationFailed(last_error.unwrap_or_else(|| {
            std::io::Error::new(ErrorKind::AlreadyExists, "無法取得唯一檔名")
        })))
    }

    /// 刪除暫存檔；檔案不存在不算錯誤，可重複呼叫
    pub fn release(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => debug!("已刪除暫存檔: {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("暫存檔已不存在: {}", path.display());
            }
            Err(e) => warn!("無法刪除暫存檔 {}: {e}", path.display()),
        }
    }

    /// 清除工作目錄中超過 `max_age` 的殘留檔案
    pub fn sweep_stale(&self, max_age: Duration) -> usize {
        sweep_stale_files(&self.directory, max_age)
    }
}
