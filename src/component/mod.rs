//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod chat_relay;
pub mod environment_check;
pub mod frame_capture;

pub use chat_relay::ChatRelay;
pub use environment_check::EnvironmentCheck;
pub use frame_capture::CaptureOrchestrator;
