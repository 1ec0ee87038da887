use crate::metadata::{MetadataField, MetadataProbe, ProbeError};
use log::debug;
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_EXIFTOOL: &str = "exiftool";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Queries the external `exiftool` program, one field per call.
#[derive(Debug, Clone)]
pub struct ExifToolProbe {
    program: OsString,
    timeout: Duration,
    available: bool,
}

impl ExifToolProbe {
    /// Checks once whether `program` runs at all; a missing tool leaves the
    /// probe unavailable instead of failing.
    pub fn detect(program: impl Into<OsString>, timeout: Duration) -> Self {
        let program = program.into();
        let mut command = Command::new(&program);
        command.arg("-ver");
        let available = match run_with_timeout(command, timeout) {
            Ok(output) => output.status.success(),
            Err(err) => {
                debug!("{} -ver failed: {err}", program.to_string_lossy());
                false
            }
        };

        Self {
            program,
            timeout,
            available,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl MetadataProbe for ExifToolProbe {
    fn name(&self) -> &str {
        "exiftool"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn query(&self, path: &Path, field: MetadataField) -> Result<String, ProbeError> {
        if !self.available {
            return Err(ProbeError::Unavailable);
        }

        let mut command = Command::new(&self.program);
        command
            .arg("-s3")
            .arg("-d")
            .arg("%Y-%m-%d_%H%M%S")
            .arg(format!("-{}", field.tag_name()))
            .arg("--")
            .arg(path);

        let output = run_with_timeout(command, self.timeout)?;
        if !output.status.success() {
            return Err(ProbeError::Failed(output.status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = stdout.lines().next().unwrap_or_default().trim();
        if value.is_empty() {
            return Err(ProbeError::Missing(field));
        }
        Ok(value.to_string())
    }
}

fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<Output, ProbeError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ProbeError::Unavailable,
            _ => ProbeError::Io(err),
        })?;

    let deadline = Instant::now() + timeout;
    loop {
        if child.try_wait()?.is_some() {
            return Ok(child.wait_with_output()?);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProbeError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
