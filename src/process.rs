use std::ffi::OsString;
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One external command with its time bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Invocation {
            program: program.to_string(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Captured result of a process that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if killed by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Typed result of running an external tool.
/// Callers branch on the variant; they never inspect output text to decide success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Process exited on its own (successfully or not)
    Completed(ProcessOutput),
    /// Program is not installed
    NotFound,
    /// Exceeded its bound (still running, or its output never closed)
    TimedOut,
    /// Could not be started or waited on for another reason
    SpawnFailed(String),
}

impl ProcessOutcome {
    /// Output of a successful run, if any
    pub fn succeeded(&self) -> Option<&ProcessOutput> {
        match self {
            ProcessOutcome::Completed(output) if output.success() => Some(output),
            _ => None,
        }
    }
}

/// Seam for running external tools, substituted by fakes in tests
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> ProcessOutcome;
}

/// Runs tools as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> ProcessOutcome {
        log::trace!(
            "Running {} {:?} (timeout {:?})",
            invocation.program,
            invocation.args,
            invocation.timeout
        );

        let mut child = match Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return ProcessOutcome::NotFound,
            Err(e) => return ProcessOutcome::SpawnFailed(e.to_string()),
        };

        // Drain pipes on their own threads so a chatty child can't block on a full pipe
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + invocation.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    log::debug!(
                        "{} exceeded {:?}, killed",
                        invocation.program,
                        invocation.timeout
                    );
                    // Reader threads are left to finish on their own; a grandchild
                    // may still hold the pipes open
                    return ProcessOutcome::TimedOut;
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return ProcessOutcome::SpawnFailed(e.to_string());
                }
            }
        };

        // Output collection shares the deadline: a background descendant that
        // inherited the pipes keeps them open after the child itself exits
        let stdout = collect(stdout, deadline);
        let stderr = collect(stderr, deadline);
        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            log::debug!(
                "{} exited but its output stayed open past {:?}",
                invocation.program,
                invocation.timeout
            );
            return ProcessOutcome::TimedOut;
        };

        ProcessOutcome::Completed(ProcessOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Wait for a reader until `deadline`. `None` if the pipe is still open then.
fn collect(reader: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<Vec<u8>> {
    let Some(reader) = reader else {
        return Some(Vec::new());
    };
    match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buf) => Some(buf),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_not_found() {
        let outcome = SystemRunner.run(&Invocation::new(
            "pastepath-definitely-not-installed",
            Duration::from_secs(1),
        ));
        assert_eq!(outcome, ProcessOutcome::NotFound);
    }

    #[test]
    fn test_captures_output_and_status() {
        let outcome = SystemRunner.run(
            &Invocation::new("sh", Duration::from_secs(5))
                .args(["-c", "printf hello; printf oops >&2; exit 3"]),
        );
        match outcome {
            ProcessOutcome::Completed(output) => {
                assert_eq!(output.code, Some(3));
                assert!(!output.success());
                assert_eq!(output.stdout_lossy(), "hello");
                assert_eq!(output.stderr_lossy(), "oops");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_slow_process_times_out() {
        let started = Instant::now();
        let outcome = SystemRunner
            .run(&Invocation::new("sleep", Duration::from_millis(200)).arg("5"));
        assert_eq!(outcome, ProcessOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_background_child_holding_pipes_times_out() {
        let started = Instant::now();
        let outcome = SystemRunner.run(
            &Invocation::new("sh", Duration::from_millis(200)).args(["-c", "sleep 4 & echo hi"]),
        );
        assert_eq!(outcome, ProcessOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_succeeded_only_for_zero_exit() {
        let good = ProcessOutcome::Completed(ProcessOutput {
            code: Some(0),
            ..Default::default()
        });
        let bad = ProcessOutcome::Completed(ProcessOutput {
            code: Some(1),
            ..Default::default()
        });
        assert!(good.succeeded().is_some());
        assert!(bad.succeeded().is_none());
        assert!(ProcessOutcome::TimedOut.succeeded().is_none());
        assert!(ProcessOutcome::NotFound.succeeded().is_none());
    }
}
