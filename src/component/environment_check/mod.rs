//! 環境檢查元件
//!
//! 確認 ffmpeg、yt-dlp、設定檔與暫存資料夾是否可用

mod diagnostics;
mod main;

pub use diagnostics::{CheckResult, DiagnosticReport, run_environment_check};
pub use main::EnvironmentCheck;
