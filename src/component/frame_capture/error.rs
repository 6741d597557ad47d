//! 擷取流程的失敗分類
//!
//! 各元件的失敗原樣傳遞到 `CaptureFailure`，不重新包裝。

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("無法使用串流解析服務: {0}")]
    BackendUnavailable(String),
    #[error("找不到可播放的直播串流: {0}")]
    NoStreamFound(String),
    #[error("串流解析逾時（{:?}）", .0)]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("擷取畫面逾時（{:?}）", .0)]
    ExtractionTimeout(Duration),
    #[error("ffmpeg 擷取畫面失敗: {diagnostic}")]
    ExtractionProcessError {
        exit_code: Option<i32>,
        diagnostic: String,
    },
    #[error("ffmpeg 未產生畫面檔案")]
    OutputNotProduced,
}

#[derive(Debug, Error)]
pub enum FileSystemFailure {
    #[error("無法配置暫存檔案: {0}")]
    AllocationFailed(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    BackendUnavailable,
    NoStreamFound,
    ResolverTimeout,
    ExtractionTimeout,
    ExtractionProcessError,
    OutputNotProduced,
    AllocationFailed,
}

#[derive(Debug, Error)]
pub enum CaptureFailure {
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),
    #[error(transparent)]
    FileSystem(#[from] FileSystemFailure),
}

impl CaptureFailure {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Resolution(ResolutionFailure::BackendUnavailable(_)) => {
                FailureKind::BackendUnavailable
            }
            Self::Resolution(ResolutionFailure::NoStreamFound(_)) => FailureKind::NoStreamFound,
            Self::Resolution(ResolutionFailure::Timeout(_)) => FailureKind::ResolverTimeout,
            Self::Extraction(ExtractionFailure::ExtractionTimeout(_)) => {
                FailureKind::ExtractionTimeout
            }
            Self::Extraction(ExtractionFailure::ExtractionProcessError { .. }) => {
                FailureKind::ExtractionProcessError
            }
            Self::Extraction(ExtractionFailure::OutputNotProduced) => {
                FailureKind::OutputNotProduced
            }
            Self::FileSystem(FileSystemFailure::AllocationFailed(_)) => {
                FailureKind::AllocationFailed
            }
        }
    }

    /// 給使用者看的失敗說明
    #[must_use]
    pub fn detail(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_inner_failure() {
        let failure: CaptureFailure =
            ResolutionFailure::NoStreamFound("直播已結束".to_string()).into();
        assert_eq!(failure.kind(), FailureKind::NoStreamFound);

        let failure: CaptureFailure = ExtractionFailure::ExtractionProcessError {
            exit_code: Some(1),
            diagnostic: "Invalid data found".to_string(),
        }
        .into();
        assert_eq!(failure.kind(), FailureKind::ExtractionProcessError);
        assert!(failure.detail().contains("Invalid data found"));
    }

    #[test]
    fn test_timeout_detail_mentions_seconds() {
        let failure: CaptureFailure =
            ExtractionFailure::ExtractionTimeout(Duration::from_secs(20)).into();
        assert_eq!(failure.kind(), FailureKind::ExtractionTimeout);
        assert!(failure.detail().contains("20s"));
    }

    #[test]
    fn test_sub_second_timeout_detail() {
        let failure: CaptureFailure = ResolutionFailure::Timeout(Duration::from_millis(300)).into();
        assert!(failure.detail().contains("300ms"), "{}", failure.detail());

        let failure: CaptureFailure =
            ExtractionFailure::ExtractionTimeout(Duration::from_millis(500)).into();
        assert!(failure.detail().contains("500ms"), "{}", failure.detail());
    }
}
