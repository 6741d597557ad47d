//! 直播畫面擷取元件
//!
//! 三個步驟：
//! A. 解析直播頁面為直接播放網址（yt-dlp）
//! B. 以 ffmpeg 擷取單張畫面（有時限）
//! C. 暫存檔案的配置與清除

mod error;
mod frame_extractor;
mod main;
mod stream_resolver;
mod temp_file_manager;
mod types;

pub use error::{
    CaptureFailure, ExtractionFailure, FailureKind, FileSystemFailure, ResolutionFailure,
};
pub use frame_extractor::{FfmpegBackend, FrameCommand, FrameExtractor, FrameExtractorBackend};
pub use main::{CaptureOrchestrator, CaptureOutcome, CaptureStage};
pub use stream_resolver::{
    DEFAULT_FORMAT_SELECTOR, ResolverBackend, StreamInfo, StreamResolver, YtDlpBackend,
    classify_backend_error,
};
pub use temp_file_manager::TempFileManager;
pub use types::{
    CaptureRequest, CapturedFrame, FrameOptions, ImageFormat, ResolvedStream, ScaleDimensions,
};
