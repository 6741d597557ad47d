use crate::config::types::{CaptureSettings, PLACEHOLDER_LIVE_URL, UserSettings};
use crate::tools::is_youtube_url;
use anyhow::{Result, bail};

/// ffmpeg `-q:v` 可接受的範圍
pub const QUALITY_RANGE: std::ops::RangeInclusive<u8> = 1..=31;

pub fn validate_capture_settings(capture: &CaptureSettings) -> Result<()> {
    if capture.resolver_timeout_secs == 0 {
        bail!("串流解析逾時必須大於 0 秒");
    }
    if capture.extractor_timeout_secs == 0 {
        bail!("畫面擷取逾時必須大於 0 秒");
    }
    if !QUALITY_RANGE.contains(&capture.quality) {
        bail!(
            "畫質等級必須介於 {} 到 {}: {}",
            QUALITY_RANGE.start(),
            QUALITY_RANGE.end(),
            capture.quality
        );
    }
    if capture.scale_width == 0 || capture.scale_height == 0 {
        bail!(
            "輸出尺寸必須大於 0: {}x{}",
            capture.scale_width,
            capture.scale_height
        );
    }
    Ok(())
}

pub fn validate_settings(settings: &UserSettings) -> Result<()> {
    validate_capture_settings(&settings.capture)?;

    let url = settings.live_stream_url.trim();
    if url.is_empty() || url == PLACEHOLDER_LIVE_URL {
        bail!("請設定直播網址（LIVE_STREAM_URL 或 settings.json）");
    }
    if !is_youtube_url(url) {
        bail!("直播網址不是有效的 YouTube 網址: {url}");
    }
    if settings.chat.trigger_commands.iter().all(|t| t.trim().is_empty()) {
        bail!("至少需要一個觸發指令");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> UserSettings {
        UserSettings {
            live_stream_url: "https://www.youtube.com/watch?v=live".to_string(),
            ..UserSettings::default()
        }
    }

    #[test]
    fn test_valid_settings() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_placeholder_url_rejected() {
        assert!(validate_settings(&UserSettings::default()).is_err());
    }

    #[test]
    fn test_non_youtube_url_rejected() {
        let mut settings = valid_settings();
        settings.live_stream_url = "https://vimeo.com/1".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_capture_ranges() {
        let mut capture = CaptureSettings::default();
        capture.quality = 0;
        assert!(validate_capture_settings(&capture).is_err());
        capture.quality = 32;
        assert!(validate_capture_settings(&capture).is_err());
        capture.quality = 31;
        assert!(validate_capture_settings(&capture).is_ok());

        capture.extractor_timeout_secs = 0;
        assert!(validate_capture_settings(&capture).is_err());

        let mut capture = CaptureSettings::default();
        capture.scale_height = 0;
        assert!(validate_capture_settings(&capture).is_err());
    }

    #[test]
    fn test_empty_triggers_rejected() {
        let mut settings = valid_settings();
        settings.chat.trigger_commands = vec!["  ".to_string()];
        assert!(validate_settings(&settings).is_err());
    }
}
