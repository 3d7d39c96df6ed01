//! Child-process runner used to drive external circuit simulators.
//!
//! Output from stdout and stderr is merged through a single pipe so the
//! interleaving matches what a terminal would show. An optional timeout
//! kills the process once it expires.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use log::{debug, warn};

/// How often a child with a deadline is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Result of running a process.
#[derive(Clone, Debug, Default)]
pub struct ProcessOutcome {
    /// Merged stdout/stderr including ANSI escape sequences
    pub raw_output: Vec<u8>,
    /// Merged output with ANSI escape sequences removed
    pub plain_output: Vec<u8>,
    /// Process exited on its own with a zero status
    pub success: bool,
    /// Process was killed because the timeout expired
    pub timed_out: bool,
    /// Exit code, when the platform reports one
    pub exit_code: Option<i32>,
}

impl ProcessOutcome {
    pub fn plain_as_string(&self) -> String {
        String::from_utf8_lossy(&self.plain_output).to_string()
    }

    pub fn raw_as_string(&self) -> String {
        String::from_utf8_lossy(&self.raw_output).to_string()
    }

    /// Write the plain output to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(&self.plain_output)?;
        Ok(())
    }

    fn finish(&mut self, status: ExitStatus, timed_out: bool) {
        self.timed_out = timed_out;
        self.success = !timed_out && status.success();
        self.exit_code = status.code();
    }
}

/// Options for running a process
pub struct RunOptions {
    /// Capture the merged output instead of inheriting the terminal
    pub capture_output: bool,
    /// Copy of the plain output, or the output sink when not capturing
    pub log_file: Option<File>,
    pub env_vars: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
    /// Kill the process after this long
    pub timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            capture_output: true,
            log_file: None,
            env_vars: Vec::new(),
            current_dir: None,
            timeout: None,
        }
    }
}

/// Wait for `child`, killing it once `timeout` expires.
/// Returns the exit status and whether the deadline was hit.
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<(ExitStatus, bool)> {
    let Some(timeout) = timeout else {
        let status = child.wait().context("Failed to wait for process")?;
        return Ok((status, false));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().context("Failed to poll process")? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            warn!(
                "Process {} exceeded its timeout of {:.1}s, killing it",
                child.id(),
                timeout.as_secs_f64()
            );
            // The process may have exited between the poll and the kill
            if let Err(e) = child.kill() {
                debug!("Kill failed: {e}");
            }
            let status = child.wait().context("Failed to reap killed process")?;
            return Ok((status, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Run `program` with `args` and wait for it to finish or time out.
pub fn run_process<S, I, T>(program: S, args: I, options: RunOptions) -> Result<ProcessOutcome>
where
    S: AsRef<str>,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let program = program.as_ref();
    let mut command = Command::new(program);
    command.args(args.into_iter().map(|s| s.as_ref().to_owned()));
    for (key, value) in options.env_vars {
        command.env(key, value);
    }
    if let Some(dir) = &options.current_dir {
        command.current_dir(dir);
    }
    command.stdin(Stdio::null());

    let mut outcome = ProcessOutcome::default();

    if options.capture_output {
        let (mut reader, writer) = os_pipe::pipe().context("Failed to create pipe")?;
        command.stdout(Stdio::from(
            writer.try_clone().context("Failed to clone pipe writer")?,
        ));
        command.stderr(Stdio::from(writer));

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn {program}"))?;
        // Release our copies of the write end so the reader sees EOF
        drop(command);

        let reader_thread = thread::spawn(move || {
            let mut buffer = Vec::new();
            reader.read_to_end(&mut buffer).map(|_| buffer)
        });

        let (status, timed_out) = wait_with_timeout(&mut child, options.timeout)?;
        outcome.finish(status, timed_out);

        outcome.raw_output = reader_thread
            .join()
            .map_err(|_| anyhow!("Output reader thread panicked"))?
            .context("Failed to read process output")?;
        outcome.plain_output = strip_ansi_escapes::strip(&outcome.raw_output);

        if let Some(mut log_file) = options.log_file {
            log_file
                .write_all(&outcome.plain_output)
                .context("Failed to write to log file")?;
        }
    } else {
        let (out, err) = match &options.log_file {
            Some(log_file) => (
                Stdio::from(log_file.try_clone().context("Failed to clone log file")?),
                Stdio::from(log_file.try_clone().context("Failed to clone log file")?),
            ),
            None => (Stdio::inherit(), Stdio::inherit()),
        };

        let mut child = command
            .stdout(out)
            .stderr(err)
            .spawn()
            .with_context(|| format!("Failed to spawn {program}"))?;
        let (status, timed_out) = wait_with_timeout(&mut child, options.timeout)?;
        outcome.finish(status, timed_out);
    }

    debug!(
        "{program} finished: success={} timed_out={} code={:?}",
        outcome.success, outcome.timed_out, outcome.exit_code
    );
    Ok(outcome)
}

/// Builder around [`run_process`]
pub struct ProcessRunner {
    program: String,
    args: Vec<String>,
    options: RunOptions,
}

impl ProcessRunner {
    pub fn new<S: AsRef<str>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            options: RunOptions::default(),
        }
    }

    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_owned()));
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.options.capture_output = capture;
        self
    }

    pub fn log_file(mut self, file: File) -> Self {
        self.options.log_file = Some(file);
        self
    }

    pub fn env<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.options
            .env_vars
            .push((key.as_ref().to_owned(), value.as_ref().to_owned()));
        self
    }

    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.options.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Kill the process if it runs longer than `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// The command line as it would be typed in a shell, for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn run(self) -> Result<ProcessOutcome> {
        debug!("Running {}", self.command_line());
        run_process(self.program, self.args, self.options)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};
    use tempfile::tempfile;

    #[test]
    fn test_run_captures_output() {
        let outcome = ProcessRunner::new("echo")
            .arg("Simulation finished")
            .run()
            .unwrap();

        assert!(outcome.success);
        assert!(!outcome.timed_out);
        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(outcome.plain_as_string().trim(), "Simulation finished");
    }

    #[test]
    fn test_stderr_is_merged() {
        let outcome = ProcessRunner::new("sh")
            .args(["-c", "echo out; echo err 1>&2; exit 3"])
            .run()
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(3));
        let text = outcome.plain_as_string();
        assert!(text.contains("out"));
        assert!(text.contains("err"));
    }

    #[test]
    fn test_env_and_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = ProcessRunner::new("sh")
            .args(["-c", "echo $NETLIST_NAME; pwd"])
            .env("NETLIST_NAME", "rc.net")
            .current_dir(dir.path())
            .run()
            .unwrap();

        let text = outcome.plain_as_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("rc.net"));
        let cwd = PathBuf::from(lines.next().unwrap());
        assert_eq!(
            cwd.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_timeout_kills_process() {
        let started = Instant::now();
        let outcome = ProcessRunner::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(200))
            .run()
            .unwrap();

        assert!(outcome.timed_out);
        assert!(!outcome.success);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_fast_process_beats_timeout() {
        let outcome = ProcessRunner::new("true")
            .timeout(Duration::from_secs(10))
            .run()
            .unwrap();
        assert!(outcome.success);
        assert!(!outcome.timed_out);
    }

    #[test]
    fn test_ansi_stripped_and_logged() {
        let mut log = tempfile().unwrap();
        let outcome = ProcessRunner::new("sh")
            .arg("-c")
            .arg("printf '\\033[31mFAILED\\033[0m'")
            .log_file(log.try_clone().unwrap())
            .run()
            .unwrap();

        assert!(outcome.raw_output.len() > outcome.plain_output.len());
        assert_eq!(outcome.plain_as_string(), "FAILED");

        log.seek(SeekFrom::Start(0)).unwrap();
        let mut content = String::new();
        log.read_to_string(&mut content).unwrap();
        assert_eq!(content, "FAILED");
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let err = ProcessRunner::new("spicekit-no-such-simulator").run().unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }

    #[test]
    fn test_command_line() {
        let runner = ProcessRunner::new("QSPICE64.exe").args(["-o", "rc.log", "rc.net"]);
        assert_eq!(runner.command_line(), "QSPICE64.exe -o rc.log rc.net");
    }
}
