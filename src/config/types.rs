use crate::component::frame_capture::{
    DEFAULT_FORMAT_SELECTOR, FrameOptions, ImageFormat, ScaleDimensions,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 尚未設定直播網址時的預設值
pub const PLACEHOLDER_LIVE_URL: &str = "https://youtube.com/watch?v=YOUR_LIVE_STREAM_ID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 擷取流程設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub work_dir: PathBuf,
    pub image_format: ImageFormat,
    /// ffmpeg `-q:v`（1-31）
    pub quality: u8,
    pub scale_width: u32,
    pub scale_height: u32,
    pub resolver_timeout_secs: u64,
    pub extractor_timeout_secs: u64,
    pub format_selector: String,
    pub ytdlp_program: String,
    pub ffmpeg_program: String,
    pub stale_frame_max_age_hours: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("temp_frames"),
            image_format: ImageFormat::Jpg,
            quality: 2,
            scale_width: 1280,
            scale_height: 720,
            resolver_timeout_secs: 30,
            extractor_timeout_secs: 20,
            format_selector: DEFAULT_FORMAT_SELECTOR.to_string(),
            ytdlp_program: "yt-dlp".to_string(),
            ffmpeg_program: "ffmpeg".to_string(),
            stale_frame_max_age_hours: 24,
        }
    }
}

impl CaptureSettings {
    #[must_use]
    pub const fn resolver_timeout(&self) -> Duration {
        Duration::from_secs(self.resolver_timeout_secs)
    }

    #[must_use]
    pub const fn extractor_timeout(&self) -> Duration {
        Duration::from_secs(self.extractor_timeout_secs)
    }

    #[must_use]
    pub const fn stale_frame_max_age(&self) -> Duration {
        Duration::from_secs(self.stale_frame_max_age_hours.saturating_mul(3600))
    }

    #[must_use]
    pub const fn frame_options(&self) -> FrameOptions {
        FrameOptions {
            format: self.image_format,
            quality: self.quality,
            scale: ScaleDimensions {
                width: self.scale_width,
                height: self.scale_height,
            },
        }
    }
}

/// 聊天指令與權限設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub trigger_commands: Vec<String>,
    pub allowed_user_ids: Vec<i64>,
    /// 允許名單為空時是否開放所有人
    pub allow_all_when_empty: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            trigger_commands: vec!["btc".to_string(), "capture".to_string(), "frame".to_string()],
            allowed_user_ids: Vec::new(),
            allow_all_when_empty: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub live_stream_url: String,
    /// 主控台模式下畫面的輸出資料夾
    pub delivery_dir: PathBuf,
    pub capture: CaptureSettings,
    pub chat: ChatSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            live_stream_url: PLACEHOLDER_LIVE_URL.to_string(),
            delivery_dir: PathBuf::from("captured_frames"),
            capture: CaptureSettings::default(),
            chat: ChatSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
}
