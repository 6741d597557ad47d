use anyhow::Result;
use console::{Term, style};
use live_frame_capture::component::frame_capture::TempFileManager;
use live_frame_capture::config::types::Config;
use live_frame_capture::init;
use live_frame_capture::menu::show_main_menu;
use live_frame_capture::signal::setup_shutdown_signal;
use log::{info, warn};
use rust_i18n::t;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal()?;

    // Load config and set locale
    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    // 清除上次異常結束時留下的暫存畫面
    let capture = &config.settings.capture;
    match TempFileManager::new(&capture.work_dir) {
        Ok(files) => {
            let removed = files.sweep_stale(capture.stale_frame_max_age());
            if removed > 0 {
                info!("啟動時清除 {removed} 個過期暫存檔");
            }
        }
        Err(e) => warn!("無法建立暫存資料夾 {}: {e}", capture.work_dir.display()),
    }

    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style(t!("main_menu.error_prefix")).red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
