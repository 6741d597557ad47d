use super::error::ResolutionFailure;
use super::types::ResolvedStream;
use crate::tools::{ProcessOutcome, run_with_timeout};
use chrono::Utc;
use log::{debug, info};
use regex::Regex;
use serde::Deserialize;
use std::process::Command;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use url::Url;

/// 單一影音合併格式，優先 mp4 以配合 ffmpeg
pub const DEFAULT_FORMAT_SELECTOR: &str = "best[ext=mp4]/best";

/// yt-dlp 對「直播不存在/未開始/已下架」的錯誤訊息
static REGEX_NO_STREAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(is offline|not currently live|live event will begin|premieres in|video unavailable|private video|has been removed|no longer available|not available in your country|geo.?restrict|requested format is not available|does not exist)",
    )
    .expect("Invalid regex")
});

/// 解析後端回傳的影片資訊（只取用到的欄位）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamInfo {
    pub url: Option<String>,
    pub is_live: Option<bool>,
    pub live_status: Option<String>,
    pub title: Option<String>,
}

/// 串流解析後端
pub trait ResolverBackend: Send + Sync {
    fn extract_info(
        &self,
        page_url: &Url,
        timeout: Duration,
    ) -> Result<StreamInfo, ResolutionFailure>;
}

/// 以 yt-dlp 子程序解析直播網址
#[derive(Debug, Clone)]
pub struct YtDlpBackend {
    program: String,
    format_selector: String,
}

impl Default for YtDlpBackend {
    fn default() -> Self {
        Self::new("yt-dlp", DEFAULT_FORMAT_SELECTOR)
    }
}

impl YtDlpBackend {
    #[must_use]
    pub fn new(program: impl Into<String>, format_selector: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format_selector: format_selector.into(),
        }
    }

    #[must_use]
    pub fn build_command(&self, page_url: &Url, timeout: Duration) -> Command {
        let socket_timeout = timeout.as_secs().max(1).to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "--quiet",
            "--no-warnings",
            "--no-playlist",
            "--skip-download",
            "--dump-single-json",
            "--format",
            self.format_selector.as_str(),
            "--socket-timeout",
            socket_timeout.as_str(),
        ]);
        cmd.arg(page_url.as_str());
        cmd
    }
}

impl ResolverBackend for YtDlpBackend {
    fn extract_info(
        &self,
        page_url: &Url,
        timeout: Duration,
    ) -> Result<StreamInfo, ResolutionFailure> {
        let outcome = run_with_timeout(self.build_command(page_url, timeout), timeout)
            .map_err(|e| {
                ResolutionFailure::BackendUnavailable(format!("無法執行 {}: {e}", self.program))
            })?;

        match outcome {
            ProcessOutcome::TimedOut { .. } => Err(ResolutionFailure::Timeout(timeout)),
            ProcessOutcome::Completed(output) if !output.success() => {
                Err(classify_backend_error(&output.stderr))
            }
            ProcessOutcome::Completed(output) => serde_json::from_str(&output.stdout)
                .map_err(|e| {
                    ResolutionFailure::BackendUnavailable(format!("無法解析 yt-dlp 輸出: {e}"))
                }),
        }
    }
}

/// 依 yt-dlp 的錯誤訊息判斷是「沒有直播」還是後端本身出問題
#[must_use]
pub fn classify_backend_error(stderr: &str) -> ResolutionFailure {
    let message = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("yt-dlp 回傳錯誤但沒有訊息")
        .trim_start_matches("ERROR:")
        .trim()
        .to_string();

    if REGEX_NO_STREAM.is_match(stderr) {
        ResolutionFailure::NoStreamFound(message)
    } else {
        ResolutionFailure::BackendUnavailable(message)
    }
}

/// 將直播頁面網址解析為可直接播放的媒體網址
#[derive(Clone)]
pub struct StreamResolver {
    backend: Arc<dyn ResolverBackend>,
}

impl StreamResolver {
    pub fn new(backend: Arc<dyn ResolverBackend>) -> Self {
        Self { backend }
    }

    pub fn resolve(
        &self,
        page_url: &str,
        timeout: Duration,
    ) -> Result<ResolvedStream, ResolutionFailure> {
        let url = parse_page_url(page_url)?;

        info!("解析直播串流網址: {url}");
        let info = self.backend.extract_info(&url, timeout)?;

        let media_url = info
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ResolutionFailure::NoStreamFound(describe_missing_stream(&info)))?;

        debug!(
            "串流解析完成: title={:?}, live_status={:?}",
            info.title, info.live_status
        );

        Ok(ResolvedStream {
            media_url: media_url.to_string(),
            resolved_at: Utc::now(),
        })
    }
}

fn parse_page_url(page_url: &str) -> Result<Url, ResolutionFailure> {
    let url = Url::parse(page_url.trim())
        .map_err(|e| ResolutionFailure::NoStreamFound(format!("網址格式錯誤: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ResolutionFailure::NoStreamFound(format!(
            "不支援的網址協定: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

fn describe_missing_stream(info: &StreamInfo) -> String {
    match (info.is_live, info.live_status.as_deref()) {
        (_, Some("is_upcoming")) => "直播尚未開始".to_string(),
        (_, Some("was_live" | "post_live")) => "直播已結束".to_string(),
        (Some(false), _) => "目前沒有進行中的直播".to_string(),
        _ => "解析結果沒有可播放的網址".to_string(),
    }
}
