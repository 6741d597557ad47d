use crate::component::frame_capture::ImageFormat;
use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use crate::menu::handlers::{
    run_capture_now, run_chat_console, run_environment_check, run_sweep_stale_frames,
};
use crate::tools::is_youtube_url;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());
    println!(
        "{} {}",
        style(t!("main_menu.live_url")).dim(),
        config.settings.live_stream_url
    );

    let options = vec![
        t!("main_menu.opt_capture"),
        t!("main_menu.opt_chat"),
        t!("main_menu.opt_env_check"),
        t!("main_menu.opt_sweep"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_capture_now(term, config)?;
            Ok(true)
        }
        Some(1) => {
            run_chat_console(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            run_environment_check(term, config)?;
            Ok(true)
        }
        Some(3) => {
            run_sweep_stale_frames(term, config)?;
            Ok(true)
        }
        Some(4) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(5) => Ok(false),
        None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_live_url"),
            t!("settings.opt_image_format"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_live_url_menu(term, config)?,
            Some(1) => show_image_format_menu(term, config)?,
            Some(2) => show_language_menu(term, config)?,
            Some(3) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 直播網址設定
fn show_live_url_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.live_url.title")).cyan().bold());
    println!(
        "\n{} {}",
        style(t!("settings.live_url.current")).dim(),
        config.settings.live_stream_url
    );
    println!();

    let url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.live_url.prompt"))
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() || is_youtube_url(input.trim()) {
                Ok(())
            } else {
                Err(t!("settings.live_url.invalid").to_string())
            }
        })
        .interact_text_on(term)?;

    // 空白輸入視為取消
    let url = url.trim();
    if url.is_empty() || url == config.settings.live_stream_url {
        return Ok(());
    }

    config.settings.live_stream_url = url.to_string();
    save_settings(&config.settings)?;
    println!("\n{} {}", style(t!("settings.saved")).green(), url);
    std::thread::sleep(std::time::Duration::from_secs(1));

    Ok(())
}

/// 圖片格式設定
fn show_image_format_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.image_format.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let formats = [ImageFormat::Jpg, ImageFormat::Png];
    let items: Vec<String> = formats.iter().map(ToString::to_string).collect();

    let default_index = formats
        .iter()
        .position(|&f| f == config.settings.capture.image_format)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.image_format.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_format = formats[selection];

    if selected_format != config.settings.capture.image_format {
        config.settings.capture.image_format = selected_format;
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_format
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];

    let items: Vec<String> = languages.iter().map(|l: &Language| l.to_string()).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
