use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpg,
    Png,
}

impl ImageFormat {
    /// 輸出檔案副檔名（不含點），ffmpeg 依此決定編碼器
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleDimensions {
    pub width: u32,
    pub height: u32,
}

impl ScaleDimensions {
    #[must_use]
    pub fn filter(&self) -> String {
        format!("scale={}:{}", self.width, self.height)
    }
}

/// 單張畫面的輸出參數
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    pub format: ImageFormat,
    /// ffmpeg `-q:v` 等級（1-31，數字越小品質越好）
    pub quality: u8,
    pub scale: ScaleDimensions,
}

/// 一次擷取所需的全部參數，每次呼叫建立，建立後不再變動
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub page_url: String,
    pub resolver_timeout: Duration,
    pub extractor_timeout: Duration,
    pub frame_options: FrameOptions,
}

/// 解析後的直接播放網址，只在短時間內有效，不可快取
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    pub media_url: String,
    pub resolved_at: DateTime<Utc>,
}

/// 已擷取的畫面檔案
///
/// 交給呼叫端後由呼叫端負責釋放（`CaptureOrchestrator::release`），
/// 不會在 drop 時自動刪除。
#[derive(Debug)]
pub struct CapturedFrame {
    path: PathBuf,
    size_bytes: u64,
    format: ImageFormat,
}

impl CapturedFrame {
    pub(crate) const fn new(path: PathBuf, size_bytes: u64, format: ImageFormat) -> Self {
        Self {
            path,
            size_bytes,
            format,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    pub(crate) fn into_path(self) -> PathBuf {
        self.path
    }
}
