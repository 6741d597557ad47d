use crate::component::chat_relay::{ChatRelay, ChatTransport, ConsoleTransport, IncomingMessage};
use crate::component::environment_check::EnvironmentCheck;
use crate::component::frame_capture::CaptureOrchestrator;
use crate::config::{Config, validate_settings};
use crate::pause;
use crate::tools::{sweep_stale_files, validate_directory_exists};
use anyhow::Result;
use console::{Term, style};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use log::{info, warn};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 主控台使用者的 ID：允許名單的第一位，沒有名單則為 0
fn console_user_id(config: &Config) -> i64 {
    config
        .settings
        .chat
        .allowed_user_ids
        .first()
        .copied()
        .unwrap_or(0)
}

/// 擷取設定不合法時回傳錯誤；直播網址等其餘問題只顯示警告
fn build_orchestrator(config: &Config) -> Result<Arc<CaptureOrchestrator>> {
    let orchestrator = CaptureOrchestrator::from_settings(&config.settings.capture)?;

    if let Err(e) = validate_settings(&config.settings) {
        warn!("設定檢查未通過: {e:#}");
        println!("{} {e:#}", style(t!("common.warning")).yellow().bold());
    }
    Ok(Arc::new(orchestrator))
}

pub fn run_capture_now(term: &Term, config: &Config) -> Result<()> {
    println!("{}", style(t!("capture.title")).cyan().bold());

    let result = build_orchestrator(config).and_then(|orchestrator| {
        let mut transport = ConsoleTransport::new(&config.settings.delivery_dir);
        transport.send_status(&t!("chat.capturing"))?;

        match orchestrator.capture(&config.settings.live_stream_url) {
            Ok(frame) => {
                let sent = transport.reply_photo(frame.path(), &t!("chat.caption"));
                orchestrator.release(frame);
                transport.finish_status(None)?;
                sent
            }
            Err(failure) => {
                transport.finish_status(None)?;
                println!(
                    "{} {}",
                    style(t!("chat.capture_failed")).red().bold(),
                    failure.detail()
                );
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
    }

    pause(term)?;
    Ok(())
}

/// 在主控台模擬聊天室，訊息交給 `ChatRelay` 處理
pub fn run_chat_console(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    println!("{}", style(t!("chat_console.title")).cyan().bold());
    println!("{}", style(t!("chat_console.hint")).dim());

    let relay = match build_orchestrator(config) {
        Ok(orchestrator) => ChatRelay::from_settings(orchestrator, &config.settings),
        Err(e) => {
            eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
            pause(term)?;
            return Ok(());
        }
    };
    println!(
        "{} {}",
        style(t!("chat_console.triggers")).dim(),
        relay.router().triggers().join(", ")
    );

    let user_id = console_user_id(config);
    let mut transport = ConsoleTransport::new(&config.settings.delivery_dir);

    while !shutdown_signal.load(Ordering::SeqCst) {
        let text: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("you")
            .allow_empty(true)
            .interact_text_on(term)?;

        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Err(e) = relay.handle_message(&mut transport, &IncomingMessage::new(user_id, text)) {
            warn!("處理訊息失敗: {e:#}");
            eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
        }
    }

    info!(
        "聊天模式結束，共輸出 {} 張畫面",
        transport.delivered().len()
    );
    Ok(())
}

pub fn run_environment_check(term: &Term, config: &Config) -> Result<()> {
    EnvironmentCheck::new(&config.settings).run();
    pause(term)?;
    Ok(())
}

pub fn run_sweep_stale_frames(term: &Term, config: &Config) -> Result<()> {
    let capture = &config.settings.capture;
    if let Err(e) = validate_directory_exists(&capture.work_dir) {
        println!("{} {e}", style(t!("common.warning")).yellow().bold());
        pause(term)?;
        return Ok(());
    }

    let removed = sweep_stale_files(&capture.work_dir, capture.stale_frame_max_age());

    println!(
        "{}",
        style(t!("sweep.done", count = removed, dir = capture.work_dir.display()))
            .green()
    );

    pause(term)?;
    Ok(())
}
