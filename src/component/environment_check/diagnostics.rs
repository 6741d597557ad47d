use crate::component::frame_capture::TempFileManager;
use crate::config::{UserSettings, validate_settings};
use crate::tools::{ProcessOutcome, format_file_size, is_youtube_url, run_with_timeout};
use log::{debug, warn};
use std::io::ErrorKind;
use std::process::Command;
use std::time::Duration;
use sysinfo::System;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    pub checks: Vec<CheckResult>,
}

impl DiagnosticReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    #[must_use]
    pub fn failed(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }
}

/// 檢查擷取流程所需的外部程式、設定與工作資料夾
#[must_use]
pub fn run_environment_check(settings: &UserSettings) -> DiagnosticReport {
    let capture = &settings.capture;
    let checks = vec![
        check_program("ffmpeg", &capture.ffmpeg_program, "-version"),
        check_program("yt-dlp", &capture.ytdlp_program, "--version"),
        check_configuration(settings),
        check_live_url(&settings.live_stream_url),
        check_work_dir(settings),
        system_info(),
    ];

    for check in checks.iter().filter(|c| !c.passed) {
        warn!("環境檢查未通過 [{}]: {}", check.name, check.detail);
    }

    DiagnosticReport { checks }
}

fn check_program(name: &str, program: &str, version_arg: &str) -> CheckResult {
    let mut command = Command::new(program);
    command.arg(version_arg);

    match run_with_timeout(command, PROBE_TIMEOUT) {
        Ok(ProcessOutcome::Completed(output)) if output.success() => {
            let version = output.stdout.lines().next().unwrap_or_default().trim();
            debug!("{name} 版本: {version}");
            CheckResult::pass(name, version)
        }
        Ok(ProcessOutcome::Completed(output)) => CheckResult::fail(
            name,
            format!(
                "結束碼 {:?}: {}",
                output.exit_code,
                output.stderr.lines().last().unwrap_or_default().trim()
            ),
        ),
        Ok(ProcessOutcome::TimedOut { elapsed, .. }) => {
            CheckResult::fail(name, format!("執行逾時 ({}s)", elapsed.as_secs()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            CheckResult::fail(name, format!("找不到程式: {program}"))
        }
        Err(e) => CheckResult::fail(name, format!("無法執行 {program}: {e}")),
    }
}

fn check_configuration(settings: &UserSettings) -> CheckResult {
    const NAME: &str = "configuration";
    match validate_settings(settings) {
        Ok(()) => CheckResult::pass(NAME, "OK"),
        Err(e) => CheckResult::fail(NAME, format!("{e:#}")),
    }
}

fn check_live_url(url: &str) -> CheckResult {
    const NAME: &str = "live url";
    if is_youtube_url(url) {
        CheckResult::pass(NAME, url)
    } else {
        CheckResult::fail(NAME, format!("不是 YouTube 網址: {url}"))
    }
}

/// 實際配置並釋放一個暫存檔
fn check_work_dir(settings: &UserSettings) -> CheckResult {
    const NAME: &str = "work dir";
    let capture = &settings.capture;

    let files = match TempFileManager::new(&capture.work_dir) {
        Ok(files) => files,
        Err(e) => return CheckResult::fail(NAME, e.to_string()),
    };

    match files.allocate(capture.image_format.extension()) {
        Ok(path) => {
            files.release(&path);
            CheckResult::pass(NAME, files.directory().display().to_string())
        }
        Err(e) => CheckResult::fail(NAME, e.to_string()),
    }
}

fn system_info() -> CheckResult {
    let mut system = System::new();
    system.refresh_memory();

    let detail = format!(
        "{} {} (kernel {}), RAM {}",
        System::name().unwrap_or_else(|| "unknown".to_string()),
        System::os_version().unwrap_or_default(),
        System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
        format_file_size(system.total_memory())
    );
    CheckResult::pass("system", detail)
}
