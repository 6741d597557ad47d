use crate::tools::{ensure_directory_exists, format_file_size};
use anyhow::{Context, Result};
use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(user_id: i64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            text: text.into(),
        }
    }
}

/// 聊天平台的回覆介面
pub trait ChatTransport {
    fn reply_text(&mut self, text: &str) -> Result<()>;

    /// 傳送圖片；回傳後呼叫端即會刪除 `path`
    fn reply_photo(&mut self, path: &Path, caption: &str) -> Result<()>;

    fn send_status(&mut self, text: &str) -> Result<()>;

    /// `None` 移除狀態訊息，`Some` 以新文字取代
    fn finish_status(&mut self, replacement: Option<&str>) -> Result<()>;
}

/// 主控台版本：狀態以 spinner 顯示，圖片複製到輸出資料夾
pub struct ConsoleTransport {
    delivery_dir: PathBuf,
    status: Option<ProgressBar>,
    delivered: Vec<PathBuf>,
}

impl ConsoleTransport {
    pub fn new(delivery_dir: impl Into<PathBuf>) -> Self {
        Self {
            delivery_dir: delivery_dir.into(),
            status: None,
            delivered: Vec::new(),
        }
    }

    #[must_use]
    pub fn delivered(&self) -> &[PathBuf] {
        &self.delivered
    }

    fn delivery_path(&self, source: &Path) -> PathBuf {
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg");
        self.delivery_dir.join(format!(
            "frame_{}.{extension}",
            Local::now().format("%Y%m%d_%H%M%S_%3f")
        ))
    }
}

impl ChatTransport for ConsoleTransport {
    fn reply_text(&mut self, text: &str) -> Result<()> {
        println!("{} {}", style("bot>").cyan().bold(), text);
        Ok(())
    }

    fn reply_photo(&mut self, path: &Path, caption: &str) -> Result<()> {
        ensure_directory_exists(&self.delivery_dir)?;

        let destination = self.delivery_path(path);
        let size = fs::copy(path, &destination).with_context(|| {
            format!("無法輸出畫面檔案: {}", destination.display())
        })?;

        println!(
            "{} {}\n     {} ({})",
            style("bot>").cyan().bold(),
            caption,
            style(destination.display()).green(),
            format_file_size(size)
        );
        self.delivered.push(destination);
        Ok(())
    }

    fn send_status(&mut self, text: &str) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("Invalid progress bar template"),
        );
        spinner.set_message(text.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));

        if let Some(previous) = self.status.replace(spinner) {
            previous.finish_and_clear();
        }
        Ok(())
    }

    fn finish_status(&mut self, replacement: Option<&str>) -> Result<()> {
        if let Some(spinner) = self.status.take() {
            match replacement {
                Some(text) => spinner.finish_with_message(text.to_string()),
                None => spinner.finish_and_clear(),
            }
        }
        Ok(())
    }
}
