use super::authorization::AllowList;
use super::command_router::{ChatCommand, CommandRouter};
use super::transport::{ChatTransport, IncomingMessage};
use crate::component::frame_capture::{CaptureFailure, CaptureOrchestrator, CapturedFrame};
use crate::config::UserSettings;
use anyhow::Result;
use log::{info, warn};
use rust_i18n::t;
use std::sync::Arc;

const MAX_DETAIL_CHARS: usize = 500;

/// 聊天指令轉接：驗證使用者、解析指令、觸發擷取並回覆結果
pub struct ChatRelay {
    orchestrator: Arc<CaptureOrchestrator>,
    router: CommandRouter,
    allow_list: AllowList,
    live_stream_url: String,
}

impl ChatRelay {
    pub fn new(
        orchestrator: Arc<CaptureOrchestrator>,
        router: CommandRouter,
        allow_list: AllowList,
        live_stream_url: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator,
            router,
            allow_list,
            live_stream_url: live_stream_url.into(),
        }
    }

    pub fn from_settings(orchestrator: Arc<CaptureOrchestrator>, settings: &UserSettings) -> Self {
        Self::new(
            orchestrator,
            CommandRouter::new(&settings.chat.trigger_commands),
            AllowList::from_settings(&settings.chat),
            settings.live_stream_url.as_str(),
        )
    }

    #[must_use]
    pub const fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn handle_message<T: ChatTransport>(
        &self,
        transport: &mut T,
        message: &IncomingMessage,
    ) -> Result<()> {
        if !self.allow_list.is_authorized(message.user_id) {
            warn!("未授權的使用者 {} 嘗試使用指令", message.user_id);
            return transport.reply_text(&t!("chat.unauthorized"));
        }

        match self.router.route(&message.text) {
            ChatCommand::Start => transport.reply_text(&t!(
                "chat.welcome",
                triggers = self.router.triggers().join(", ")
            )),
            ChatCommand::Help => transport.reply_text(&t!(
                "chat.help",
                triggers = self.router.triggers().join(", ")
            )),
            ChatCommand::Capture => self.handle_capture(transport, message.user_id),
            ChatCommand::Ignored => Ok(()),
        }
    }

    fn handle_capture<T: ChatTransport>(&self, transport: &mut T, user_id: i64) -> Result<()> {
        info!("使用者 {user_id} 要求擷取畫面");
        transport.send_status(&t!("chat.capturing"))?;

        match self.orchestrator.capture(&self.live_stream_url) {
            Ok(frame) => self.deliver(transport, frame),
            Err(failure) => {
                warn!("擷取失敗 ({:?}): {failure}", failure.kind());
                transport.finish_status(Some(&failure_message(&failure)))
            }
        }
    }

    fn deliver<T: ChatTransport>(&self, transport: &mut T, frame: CapturedFrame) -> Result<()> {
        let sent = transport.reply_photo(frame.path(), &t!("chat.caption"));
        // 不論傳送成功與否都要刪除暫存檔
        self.orchestrator.release(frame);

        match sent {
            Ok(()) => transport.finish_status(None),
            Err(e) => {
                warn!("傳送畫面失敗: {e:#}");
                transport.finish_status(Some(&t!("chat.send_failed")))
            }
        }
    }
}

fn failure_message(failure: &CaptureFailure) -> String {
    let mut detail = failure.detail();
    if let Some((cut, _)) = detail.char_indices().nth(MAX_DETAIL_CHARS) {
        detail.truncate(cut);
        detail.push_str("...");
    }
    format!("{}\n{detail}", t!("chat.capture_failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::frame_capture::{
        FrameExtractor, FrameExtractorBackend, ResolutionFailure, ResolverBackend, StreamInfo,
        StreamResolver, TempFileManager,
    };
    use crate::config::CaptureSettings;
    use crate::tools::{ProcessOutcome, ProcessOutput};
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;
    use url::Url;

    struct LiveBackend;

    impl ResolverBackend for LiveBackend {
        fn extract_info(
            &self,
            _page_url: &Url,
            _timeout: Duration,
        ) -> Result<StreamInfo, ResolutionFailure> {
            Ok(StreamInfo {
                url: Some("https://cdn.example.com/live.m3u8".to_string()),
                is_live: Some(true),
                ..StreamInfo::default()
            })
        }
    }

    struct OfflineBackend;

    impl ResolverBackend for OfflineBackend {
        fn extract_info(
            &self,
            _page_url: &Url,
            _timeout: Duration,
        ) -> Result<StreamInfo, ResolutionFailure> {
            Err(ResolutionFailure::NoStreamFound(
                "This live event will begin in a few moments".to_string(),
            ))
        }
    }

    struct WritingBackend;

    impl FrameExtractorBackend for WritingBackend {
        fn run(&self, args: &[String], _timeout: Duration) -> io::Result<ProcessOutcome> {
            let output = args.last().map(PathBuf::from).unwrap_or_default();
            fs::write(output, vec![0xFF; 2048])?;
            Ok(ProcessOutcome::Completed(ProcessOutput {
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }))
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Text(String),
        Photo(PathBuf),
        Status(String),
        Finish(Option<String>),
    }

    #[derive(Default)]
    struct RecordingTransport {
        events: Vec<Event>,
        fail_photo: bool,
    }

    impl ChatTransport for RecordingTransport {
        fn reply_text(&mut self, text: &str) -> Result<()> {
            self.events.push(Event::Text(text.to_string()));
            Ok(())
        }

        fn reply_photo(&mut self, path: &Path, _caption: &str) -> Result<()> {
            assert!(path.exists());
            self.events.push(Event::Photo(path.to_path_buf()));
            if self.fail_photo {
                anyhow::bail!("network down");
            }
            Ok(())
        }

        fn send_status(&mut self, text: &str) -> Result<()> {
            self.events.push(Event::Status(text.to_string()));
            Ok(())
        }

        fn finish_status(&mut self, replacement: Option<&str>) -> Result<()> {
            self.events
                .push(Event::Finish(replacement.map(str::to_string)));
            Ok(())
        }
    }

    fn relay(
        work_dir: &Path,
        resolver: Arc<dyn ResolverBackend>,
        allowed: Vec<i64>,
    ) -> ChatRelay {
        let orchestrator = CaptureOrchestrator::new(
            StreamResolver::new(resolver),
            FrameExtractor::new(Arc::new(WritingBackend)),
            TempFileManager::new(work_dir).unwrap(),
            &CaptureSettings::default(),
        );
        ChatRelay::new(
            Arc::new(orchestrator),
            CommandRouter::new(&["btc", "frame"]),
            AllowList::new(allowed, true),
            "https://www.youtube.com/watch?v=live123",
        )
    }

    fn dir_is_empty(path: &Path) -> bool {
        fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_capture_delivers_and_releases() {
        let temp_dir = TempDir::new().unwrap();
        let relay = relay(temp_dir.path(), Arc::new(LiveBackend), Vec::new());
        let mut transport = RecordingTransport::default();

        relay
            .handle_message(&mut transport, &IncomingMessage::new(1, "BTC"))
            .unwrap();

        assert_eq!(transport.events.len(), 3);
        assert!(matches!(transport.events[0], Event::Status(_)));
        assert!(matches!(transport.events[1], Event::Photo(_)));
        assert_eq!(transport.events[2], Event::Finish(None));
        assert!(dir_is_empty(temp_dir.path()));
    }

    #[test]
    fn test_send_failure_still_releases() {
        let temp_dir = TempDir::new().unwrap();
        let relay = relay(temp_dir.path(), Arc::new(LiveBackend), Vec::new());
        let mut transport = RecordingTransport {
            fail_photo: true,
            ..RecordingTransport::default()
        };

        relay
            .handle_message(&mut transport, &IncomingMessage::new(1, "frame"))
            .unwrap();

        assert!(matches!(transport.events.last(), Some(Event::Finish(Some(_)))));
        assert!(dir_is_empty(temp_dir.path()));
    }

    #[test]
    fn test_capture_failure_reports_detail() {
        let temp_dir = TempDir::new().unwrap();
        let relay = relay(temp_dir.path(), Arc::new(OfflineBackend), Vec::new());
        let mut transport = RecordingTransport::default();

        relay
            .handle_message(&mut transport, &IncomingMessage::new(1, "btc"))
            .unwrap();

        match transport.events.last() {
            Some(Event::Finish(Some(text))) => {
                assert!(text.contains("This live event will begin"));
            }
            other => panic!("unexpected last event: {other:?}"),
        }
        assert!(dir_is_empty(temp_dir.path()));
    }

    #[test]
    fn test_unauthorized_user_gets_no_capture() {
        let temp_dir = TempDir::new().unwrap();
        let relay = relay(temp_dir.path(), Arc::new(LiveBackend), vec![42]);
        let mut transport = RecordingTransport::default();

        relay
            .handle_message(&mut transport, &IncomingMessage::new(7, "btc"))
            .unwrap();

        assert_eq!(transport.events.len(), 1);
        assert!(matches!(transport.events[0], Event::Text(_)));
    }

    #[test]
    fn test_start_and_ignored_messages() {
        let temp_dir = TempDir::new().unwrap();
        let relay = relay(temp_dir.path(), Arc::new(LiveBackend), Vec::new());
        let mut transport = RecordingTransport::default();

        relay
            .handle_message(&mut transport, &IncomingMessage::new(1, "/start"))
            .unwrap();
        relay
            .handle_message(&mut transport, &IncomingMessage::new(1, "good morning"))
            .unwrap();

        assert_eq!(transport.events.len(), 1);
        match &transport.events[0] {
            Event::Text(text) => assert!(text.contains("btc, frame")),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_failure_message_truncates_long_detail() {
        let failure = CaptureFailure::from(ResolutionFailure::NoStreamFound("x".repeat(2000)));
        let message = failure_message(&failure);
        assert!(message.ends_with("..."));
        assert!(message.chars().count() < 600);
    }
}
