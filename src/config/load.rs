use crate::config::types::{Config, UserSettings};
use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    /// 讀取 settings.json，再套用環境變數覆寫
    pub fn new() -> Result<Self> {
        let mut settings = Self::load_settings(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
            warn!("設定檔讀取失敗，使用預設值: {e:#}");
            UserSettings::default()
        });
        apply_env_overrides(&mut settings, &std::env::vars().collect())?;

        Ok(Self { settings })
    }

    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}

/// 套用環境變數：`LIVE_STREAM_URL`（或 `YOUTUBE_LIVE_URL`）、`ALLOWED_USER_IDS`、`FRAME_TEMP_DIR`
pub fn apply_env_overrides(
    settings: &mut UserSettings,
    env: &HashMap<String, String>,
) -> Result<()> {
    if let Some(url) =
        non_empty(env, "LIVE_STREAM_URL").or_else(|| non_empty(env, "YOUTUBE_LIVE_URL"))
    {
        info!("使用環境變數中的直播網址");
        settings.live_stream_url = url.to_string();
    }

    if let Some(raw_ids) = non_empty(env, "ALLOWED_USER_IDS") {
        settings.chat.allowed_user_ids = parse_user_ids(raw_ids)?;
    }

    if let Some(dir) = non_empty(env, "FRAME_TEMP_DIR") {
        settings.capture.work_dir = PathBuf::from(dir);
    }

    Ok(())
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// 解析以逗號分隔的使用者 ID，空白項目略過
pub fn parse_user_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>()
                .with_context(|| format!("無效的使用者 ID: {id}"))
        })
        .collect()
}
