//! Running external tools with streamed output and a wall-clock timeout.
//!
//! The stage operation runs the package manager and the rsync synchronizer
//! runs `rsync`; tool-availability checks run `<tool> --version`. All of them
//! go through a [`ProcessRunner`] so the output sink and timeout handling
//! live in one place.
//!
//! Output is forwarded to the caller's [`OutputSink`] one line at a time, as
//! soon as each line arrives. Two reader threads drain stdout and stderr into
//! a channel; the calling thread polls that channel and the deadline, so a
//! child that goes quiet never blocks the timeout.

use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const STDERR_TAIL_LINES: usize = 20;

/// Which output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Receives process output incrementally.
///
/// Closures of type `FnMut(OutputStream, &str)` are sinks, so callers can
/// pass `&mut |stream, line| ...` directly.
pub trait OutputSink {
    /// Called once per line, without the trailing newline.
    fn on_output(&mut self, stream: OutputStream, line: &str);
}

impl<F> OutputSink for F
where
    F: FnMut(OutputStream, &str),
{
    fn on_output(&mut self, stream: OutputStream, line: &str) {
        self(stream, line);
    }
}

/// A sink that records every line it receives.
///
/// # Examples
///
/// ```
/// use stager::process::{BufferedSink, OutputSink, OutputStream};
///
/// let mut sink = BufferedSink::new();
/// sink.on_output(OutputStream::Stdout, "Installing dependencies");
/// sink.on_output(OutputStream::Stderr, "warning: lock file out of date");
/// assert_eq!(sink.stdout(), vec!["Installing dependencies"]);
/// assert_eq!(sink.stderr(), vec!["warning: lock file out of date"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferedSink {
    lines: Vec<(OutputStream, String)>,
}

impl BufferedSink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line received, in arrival order.
    #[must_use]
    pub fn lines(&self) -> &[(OutputStream, String)] {
        &self.lines
    }

    /// Lines received on standard output.
    #[must_use]
    pub fn stdout(&self) -> Vec<&str> {
        self.filtered(OutputStream::Stdout)
    }

    /// Lines received on standard error.
    #[must_use]
    pub fn stderr(&self) -> Vec<&str> {
        self.filtered(OutputStream::Stderr)
    }

    /// Whether nothing has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn filtered(&self, stream: OutputStream) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, line)| line.as_str())
            .collect()
    }
}

impl OutputSink for BufferedSink {
    fn on_output(&mut self, stream: OutputStream, line: &str) {
        self.lines.push((stream, line.to_string()));
    }
}

/// A program invocation: executable, arguments, and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessSpec {
    /// Invoke `program` with no arguments in the inherited directory.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the inherited working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// The executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The working directory, if one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// The invocation rendered as a single line, for messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Runs external programs.
pub trait ProcessRunner: Send + Sync + fmt::Debug {
    /// Run `spec` to completion.
    ///
    /// Output lines are passed to `sink` as they arrive. `None` for
    /// `timeout` means no limit.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the program cannot be started.
    /// - [`Error::Timeout`] if the deadline passes; the child is killed.
    /// - [`Error::Process`] if the program exits unsuccessfully.
    fn run(
        &self,
        spec: &ProcessSpec,
        sink: Option<&mut dyn OutputSink>,
        timeout: Option<Duration>,
    ) -> Result<()>;
}

/// Runs programs as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    /// Create a runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(
        &self,
        spec: &ProcessSpec,
        mut sink: Option<&mut dyn OutputSink>,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let mut command = Command::new(spec.program());
        command
            .args(spec.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = spec.working_dir() {
            command.current_dir(dir);
        }

        log::debug!("running `{}`", spec.command_line());
        let mut child = command
            .spawn()
            .map_err(|e| Error::io(spec.program(), e))?;

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, OutputStream::Stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, OutputStream::Stderr, tx.clone());
        }
        drop(tx);

        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut stderr_tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

        let status = match pump(&rx, &mut sink, &mut stderr_tail, deadline) {
            Pumped::Drained => wait_until(&mut child, deadline)
                .map_err(|e| Error::io(spec.program(), e))?,
            Pumped::Expired => None,
        };

        let Some(status) = status else {
            // Best effort; the child may already have exited on its own.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                command: spec.command_line(),
                limit: timeout.unwrap_or_default(),
            });
        };

        if status.success() {
            return Ok(());
        }

        Err(Error::Process {
            command: spec.command_line(),
            status: describe_status(status),
            message: Vec::from(stderr_tail).join("\n"),
        })
    }
}

enum Pumped {
    Drained,
    Expired,
}

/// Forward lines until both readers finish or the deadline passes.
fn pump(
    rx: &Receiver<(OutputStream, String)>,
    sink: &mut Option<&mut dyn OutputSink>,
    stderr_tail: &mut VecDeque<String>,
    deadline: Option<Instant>,
) -> Pumped {
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Pumped::Expired;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok((stream, line)) => {
                if stream == OutputStream::Stderr {
                    if stderr_tail.len() == STDERR_TAIL_LINES {
                        stderr_tail.pop_front();
                    }
                    stderr_tail.push_back(line.clone());
                }
                if let Some(sink) = sink.as_deref_mut() {
                    sink.on_output(stream, &line);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Pumped::Drained,
        }
    }
}

/// Wait for exit, returning `None` if the deadline passes first.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> std::io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R>(reader: R, stream: OutputStream, tx: Sender<(OutputStream, String)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    if tx.send((stream, line)).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Wall-clock limit for in-process work that cannot be killed, checked
/// between steps.
#[derive(Debug, Clone)]
pub(crate) struct Deadline {
    command: &'static str,
    at: Option<Instant>,
    timeout: Option<Duration>,
}

impl Deadline {
    /// Start the clock; `None` never expires.
    pub(crate) fn new(command: &'static str, timeout: Option<Duration>) -> Self {
        Self {
            command,
            at: timeout.and_then(|t| Instant::now().checked_add(t)),
            timeout,
        }
    }

    /// Fail with [`Error::Timeout`] once the limit has passed.
    pub(crate) fn check(&self) -> Result<()> {
        match self.at {
            Some(at) if Instant::now() >= at => Err(Error::Timeout {
                command: self.command.to_string(),
                limit: self.timeout.unwrap_or_default(),
            }),
            _ => Ok(()),
        }
    }
}
