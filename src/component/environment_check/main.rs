use super::diagnostics::{DiagnosticReport, run_environment_check};
use crate::config::UserSettings;
use console::style;
use rust_i18n::t;

/// 環境檢查元件
pub struct EnvironmentCheck<'a> {
    settings: &'a UserSettings,
}

impl<'a> EnvironmentCheck<'a> {
    pub const fn new(settings: &'a UserSettings) -> Self {
        Self { settings }
    }

    pub fn run(&self) -> DiagnosticReport {
        println!("{}", style(t!("env_check.title")).cyan().bold());
        println!("{}", style(t!("env_check.running")).dim());

        let report = run_environment_check(self.settings);
        print_report(&report);
        report
    }
}

fn print_report(report: &DiagnosticReport) {
    for check in &report.checks {
        let mark = if check.passed {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {mark} {:<14} {}", check.name, style(&check.detail).dim());
    }

    println!();
    if report.all_passed() {
        println!("{}", style(t!("env_check.all_passed")).green().bold());
    } else {
        println!(
            "{}",
            style(t!("env_check.some_failed", count = report.failed().len())).yellow()
        );
    }
}
