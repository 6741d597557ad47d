use super::error::ExtractionFailure;
use super::types::{CapturedFrame, FrameOptions};
use crate::tools::{ProcessOutcome, run_with_timeout};
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

/// 轉檔程序的執行能力，測試時可替換成不產生真實程序的假實作
pub trait FrameExtractorBackend: Send + Sync {
    fn run(&self, args: &[String], timeout: Duration) -> std::io::Result<ProcessOutcome>;
}

/// 以 ffmpeg 子程序執行擷取
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    program: String,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegBackend {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl FrameExtractorBackend for FfmpegBackend {
    fn run(&self, args: &[String], timeout: Duration) -> std::io::Result<ProcessOutcome> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        run_with_timeout(cmd, timeout)
    }
}

/// 單張畫面擷取的 ffmpeg 參數
pub struct FrameCommand<'a> {
    stream_url: &'a str,
    output_path: &'a Path,
    options: &'a FrameOptions,
}

impl<'a> FrameCommand<'a> {
    #[must_use]
    pub const fn new(stream_url: &'a str, output_path: &'a Path, options: &'a FrameOptions) -> Self {
        Self {
            stream_url,
            output_path,
            options,
        }
    }

    /// 輸出路徑固定放在最後一個參數
    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            self.stream_url.to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            self.options.quality.to_string(),
            "-vf".to_string(),
            self.options.scale.filter(),
            "-an".to_string(),
            "-y".to_string(),
            self.output_path.to_string_lossy().to_string(),
        ]
    }
}

/// 從直接播放網址擷取一張畫面
#[derive(Clone)]
pub struct FrameExtractor {
    backend: Arc<dyn FrameExtractorBackend>,
}

impl FrameExtractor {
    pub fn new(backend: Arc<dyn FrameExtractorBackend>) -> Self {
        Self { backend }
    }

    /// 每次呼叫只啟動一個轉檔程序，不重試
    ///
    /// 任何失敗都會先刪除 `output_path` 上的殘留檔案再回傳。
    pub fn extract(
        &self,
        stream_url: &str,
        output_path: &Path,
        timeout: Duration,
        options: &FrameOptions,
    ) -> Result<CapturedFrame, ExtractionFailure> {
        let args = FrameCommand::new(stream_url, output_path, options).build_args();
        info!("擷取畫面中: {}", output_path.display());

        let result = match self.backend.run(&args, timeout) {
            Err(e) => Err(ExtractionFailure::ExtractionProcessError {
                exit_code: None,
                diagnostic: format!("無法啟動 ffmpeg: {e}"),
            }),
            Ok(ProcessOutcome::TimedOut { pid, elapsed }) => {
                warn!("ffmpeg 擷取逾時 [{pid}]，已執行 {elapsed:?}");
                Err(ExtractionFailure::ExtractionTimeout(timeout))
            }
            Ok(ProcessOutcome::Completed(output)) if !output.success() => {
                let stderr = output.stderr.trim();
                let diagnostic = if stderr.is_empty() {
                    format!("ffmpeg 結束碼 {:?}", output.exit_code)
                } else {
                    stderr.to_string()
                };
                Err(ExtractionFailure::ExtractionProcessError {
                    exit_code: output.exit_code,
                    diagnostic,
                })
            }
            Ok(ProcessOutcome::Completed(_)) => verify_output(output_path, options),
        };

        if result.is_err() {
            remove_partial_output(output_path);
        }

        result
    }
}

fn verify_output(
    output_path: &Path,
    options: &FrameOptions,
) -> Result<CapturedFrame, ExtractionFailure> {
    let size_bytes = fs::metadata(output_path)
        .map(|meta| meta.len())
        .unwrap_or(0);

    if size_bytes == 0 {
        return Err(ExtractionFailure::OutputNotProduced);
    }

    debug!("畫面擷取完成: {} ({size_bytes} bytes)", output_path.display());
    Ok(CapturedFrame::new(
        output_path.to_path_buf(),
        size_bytes,
        options.format,
    ))
}

fn remove_partial_output(output_path: &Path) {
    match fs::remove_file(output_path) {
        Ok(()) => debug!("已刪除未完成的輸出檔案: {}", output_path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("無法刪除未完成的輸出檔案 {}: {e}", output_path.display()),
    }
}
