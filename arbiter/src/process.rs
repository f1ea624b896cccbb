use std::{
    ffi::OsStr,
    io::Read,
    path::PathBuf,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, trace, warn};

use crate::OracleError;

/// How often a running oracle is polled for exit while a timeout is in effect.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How to launch one oracle program.
///
/// Every call to [`OracleCommand::run`] starts a fresh process, reads all of its
/// output, and reaps it before returning. Nothing is kept between calls.
///
/// A timeout kills only the process that was launched. The program should be
/// the oracle interpreter itself: behind a shell wrapper, whatever the shell
/// started keeps running after the wrapper is killed, unless the wrapper
/// `exec`s it.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct OracleCommand {
    program: PathBuf,
    args: Vec<String>,
    dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl OracleCommand {
    /// Creates a command that runs `program` with no arguments, in the current directory, with no time bound.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            timeout: None,
        }
    }

    /// Appends a fixed argument, passed before any per-call arguments.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several fixed arguments, passed before any per-call arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the program from within `dir`.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Kills the program if it has not halted after `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The program this command launches.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// The directory this command runs in, if not the current one.
    pub fn dir(&self) -> Option<&PathBuf> {
        self.dir.as_ref()
    }

    /// Starts the program with the fixed arguments followed by `extra`, and
    /// returns everything it printed.
    ///
    /// Standard output and standard error form a single signal channel: the
    /// returned text is stdout followed by stderr. The exit status carries no
    /// meaning and is only logged. Stdin is closed.
    pub fn run<I, S>(&self, extra: I) -> Result<String, OracleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .args(extra)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        debug!("Launching oracle: {cmd:?}");
        let mut child = cmd.spawn().map_err(|source| OracleError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.wait(&mut child) {
            Ok(status) => status,
            Err(err) => {
                // Reap the child; the drain threads finish on their own once its pipes close
                if let Err(kill_err) = child.kill() {
                    warn!("Failed to kill oracle {:?}: {kill_err}", self.program);
                }
                if let Err(wait_err) = child.wait() {
                    warn!("Failed to reap oracle {:?}: {wait_err}", self.program);
                }
                return Err(err);
            }
        };

        let mut output = collect(stdout)?;
        output.push_str(&collect(stderr)?);

        debug!("Oracle {:?} exited with {status}", self.program);
        trace!("Oracle output: {output:?}");

        Ok(output)
    }

    /// Waits for `child` to exit, honoring this command's timeout.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, OracleError> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }

            if Instant::now() >= deadline {
                return Err(OracleError::Timeout {
                    program: self.program.display().to_string(),
                    after: timeout,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Reads a child's pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::with_capacity(1024);
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

/// Joins a drain thread and decodes what it read.
fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<String, OracleError> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };

    let bytes = handle
        .join()
        .map_err(|_| OracleError::Io(std::io::Error::other("oracle output reader panicked")))??;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
