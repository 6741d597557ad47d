use super::error::CaptureFailure;
use super::frame_extractor::{FfmpegBackend, FrameExtractor};
use super::stream_resolver::{StreamResolver, YtDlpBackend};
use super::temp_file_manager::TempFileManager;
use super::types::{CaptureRequest, CapturedFrame, FrameOptions};
use crate::config::{CaptureSettings, validate_capture_settings};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub type CaptureOutcome = std::result::Result<CapturedFrame, CaptureFailure>;

/// 擷取流程的階段，只前進不回頭
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    Idle,
    Resolving,
    Extracting,
    Done,
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Extracting => "extracting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// 擷取流程協調器
///
/// 三段式流程：
/// A. 解析直播網址（yt-dlp）
/// B. 配置暫存檔並擷取單張畫面（ffmpeg）
/// C. 成功時把檔案交給呼叫端，失敗時立即清除暫存檔
///
/// 每次 `capture` 互相獨立，可在多個執行緒同時呼叫。
pub struct CaptureOrchestrator {
    resolver: StreamResolver,
    extractor: FrameExtractor,
    files: TempFileManager,
    resolver_timeout: Duration,
    extractor_timeout: Duration,
    frame_options: FrameOptions,
}

impl CaptureOrchestrator {
    pub fn new(
        resolver: StreamResolver,
        extractor: FrameExtractor,
        files: TempFileManager,
        settings: &CaptureSettings,
    ) -> Self {
        Self {
            resolver,
            extractor,
            files,
            resolver_timeout: settings.resolver_timeout(),
            extractor_timeout: settings.extractor_timeout(),
            frame_options: settings.frame_options(),
        }
    }

    /// 使用 yt-dlp 與 ffmpeg 建立協調器，逾時與畫質設定不合法時拒絕建立
    pub fn from_settings(settings: &CaptureSettings) -> Result<Self> {
        validate_capture_settings(settings).context("擷取設定不合法")?;

        let resolver = StreamResolver::new(Arc::new(YtDlpBackend::new(
            settings.ytdlp_program.as_str(),
            settings.format_selector.as_str(),
        )));
        let extractor =
            FrameExtractor::new(Arc::new(FfmpegBackend::new(settings.ffmpeg_program.as_str())));
        let files = TempFileManager::new(&settings.work_dir).with_context(|| {
            format!("無法建立暫存資料夾: {}", settings.work_dir.display())
        })?;

        Ok(Self::new(resolver, extractor, files, settings))
    }

    #[must_use]
    pub fn request_for(&self, page_url: &str) -> CaptureRequest {
        CaptureRequest {
            page_url: page_url.to_string(),
            resolver_timeout: self.resolver_timeout,
            extractor_timeout: self.extractor_timeout,
            frame_options: self.frame_options,
        }
    }

    pub fn capture(&self, page_url: &str) -> CaptureOutcome {
        self.capture_with(&self.request_for(page_url))
    }

    pub fn capture_with(&self, request: &CaptureRequest) -> CaptureOutcome {
        let capture_id = Uuid::new_v4().simple().to_string()[..8].to_string();
        let mut stage = CaptureStage::Idle;

        stage = advance(&capture_id, stage, CaptureStage::Resolving);
        let stream = self
            .resolver
            .resolve(&request.page_url, request.resolver_timeout)
            .inspect_err(|e| debug!("[{capture_id}] {stage} 失敗: {e}"))?;

        stage = advance(&capture_id, stage, CaptureStage::Extracting);
        let output_path = self
            .files
            .allocate(request.frame_options.format.extension())?;

        let result = self.extractor.extract(
            &stream.media_url,
            &output_path,
            request.extractor_timeout,
            &request.frame_options,
        );
        advance(&capture_id, stage, CaptureStage::Done);

        match result {
            Ok(frame) => {
                info!(
                    "[{capture_id}] 擷取成功: {} ({} bytes)",
                    frame.path().display(),
                    frame.size_bytes()
                );
                Ok(frame)
            }
            Err(failure) => {
                self.files.release(&output_path);
                Err(failure.into())
            }
        }
    }

    /// 呼叫端用完畫面後釋放檔案
    pub fn release(&self, frame: CapturedFrame) {
        self.files.release(&frame.into_path());
    }

    #[must_use]
    pub const fn files(&self) -> &TempFileManager {
        &self.files
    }
}

fn advance(capture_id: &str, from: CaptureStage, to: CaptureStage) -> CaptureStage {
    debug!("[{capture_id}] {from} -> {to}");
    to
}
