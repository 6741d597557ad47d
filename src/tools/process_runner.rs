use log::{debug, warn};
use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// 檢查子程序狀態的輪詢間隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 子程序結束後，讀取剩餘輸出的最短等待時間
const PIPE_GRACE: Duration = Duration::from_millis(100);

type PipeReader = Receiver<Vec<u8>>;

/// 子程序正常結束時收集到的輸出
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// 有時限的子程序執行結果
#[derive(Debug)]
pub enum ProcessOutcome {
    Completed(ProcessOutput),
    /// 超過時限，程序已被終止並回收
    TimedOut { pid: u32, elapsed: Duration },
}

/// 執行單一子程序，超過 `timeout` 即強制終止
///
/// stdout / stderr 由背景執行緒讀取，避免管線塞滿造成子程序卡住。
/// 逾時時會 `kill` 後再 `wait`，確保不留下殭屍程序。
/// 子程序結束後若管線仍被背景孫程序佔用，讀取同樣受 `timeout` 限制，
/// 只回傳時限內收到的輸出。
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> std::io::Result<ProcessOutcome> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn()?;
    let pid = child.id();
    debug!("啟動子程序 [{pid}]: {:?}", command.get_program());

    let stdout_reader = spawn_pipe_reader(child.stdout.take());
    let stderr_reader = spawn_pipe_reader(child.stderr.take());
    let started = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("子程序結束 [{pid}]: {status}");
                let output_deadline = (started + timeout).max(Instant::now() + PIPE_GRACE);
                return Ok(ProcessOutcome::Completed(ProcessOutput {
                    exit_code: status.code(),
                    stdout: collect_pipe_output(stdout_reader, output_deadline, pid),
                    stderr: collect_pipe_output(stderr_reader, output_deadline, pid),
                }));
            }
            Ok(None) => {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    warn!("子程序逾時 [{pid}]，已執行 {elapsed:?}，強制終止");
                    let _ = child.kill();
                    let _ = child.wait();
                    // 不等待讀取執行緒：孫程序可能仍持有管線
                    return Ok(ProcessOutcome::TimedOut { pid, elapsed });
                }
                thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
            }
            Err(e) => {
                warn!("無法檢查程序狀態 [{pid}]: {e}");
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }
    }
}

fn spawn_pipe_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<PipeReader> {
    let mut pipe = pipe?;
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = [0u8; 8192];
        loop {
            match pipe.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    // 接收端已放棄讀取
                    if sender.send(buffer[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
    });
    Some(receiver)
}

/// 收集管線輸出，直到管線關閉或超過 `deadline`
fn collect_pipe_output(reader: Option<PipeReader>, deadline: Instant, pid: u32) -> String {
    let Some(reader) = reader else {
        return String::new();
    };

    let mut buffer = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match reader.recv_timeout(remaining) {
            Ok(chunk) => buffer.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                warn!("子程序已結束 [{pid}]，但管線仍被其他程序佔用，停止讀取");
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn test_collects_exit_code_and_output() {
        let outcome = run_with_timeout(
            shell("echo hello; echo broken >&2; exit 3"),
            Duration::from_secs(5),
        )
        .unwrap();

        let ProcessOutcome::Completed(output) = outcome else {
            panic!("程序不應該逾時");
        };
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "broken");
    }

    #[test]
    fn test_success_exit() {
        let outcome = run_with_timeout(shell("exit 0"), Duration::from_secs(5)).unwrap();
        assert!(matches!(outcome, ProcessOutcome::Completed(ref o) if o.success()));
    }

    #[test]
    fn test_timeout_kills_process() {
        let started = Instant::now();
        let mut cmd = Command::new("sleep");
        cmd.arg("10");

        let outcome = run_with_timeout(cmd, Duration::from_millis(200)).unwrap();

        let ProcessOutcome::TimedOut { pid, elapsed } = outcome else {
            panic!("程序應該逾時");
        };
        assert!(elapsed >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(3));

        // 已被 wait 回收，/proc 下不應再有此 pid
        #[cfg(target_os = "linux")]
        assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
        let _ = pid;
    }

    #[test]
    fn test_background_child_does_not_extend_timeout() {
        let started = Instant::now();
        let outcome = run_with_timeout(
            shell("echo ready; sleep 5 & exit 0"),
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(
            started.elapsed() < Duration::from_secs(3),
            "管線被背景程序佔用時不應等待: {:?}",
            started.elapsed()
        );
        let ProcessOutcome::Completed(output) = outcome else {
            panic!("直接子程序已結束，不應視為逾時");
        };
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "ready");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let cmd = Command::new("definitely-not-an-installed-program-4f1c");
        let err = run_with_timeout(cmd, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
