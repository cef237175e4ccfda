use std::{
    path::PathBuf,
    process::{ExitStatus, Stdio},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use clean_domain::{ArtifactPaths, DomainError, TransformOutcome, TransformPort};
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
    task::JoinHandle,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MAX_DIAGNOSTIC_BYTES: usize = 8 * 1024;

/// Runs `<program> <args...> <input> <output>` as a child process and waits
/// for it under a deadline. No shell is involved.
#[derive(Debug, Clone)]
pub struct ProcessTransformer {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
    max_diagnostic_bytes: usize,
}

impl ProcessTransformer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            timeout: DEFAULT_TIMEOUT,
            max_diagnostic_bytes: DEFAULT_MAX_DIAGNOSTIC_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, working_dir: Option<PathBuf>) -> Self {
        self.working_dir = working_dir;
        self
    }

    pub fn with_max_diagnostic_bytes(mut self, max_diagnostic_bytes: usize) -> Self {
        self.max_diagnostic_bytes = max_diagnostic_bytes;
        self
    }

    fn failure_details(&self, status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> String {
        let exit = match status.code() {
            Some(code) => format!("exited with status {code}"),
            None => "was terminated by a signal".to_string(),
        };
        let stderr = String::from_utf8_lossy(stderr);
        let stdout = String::from_utf8_lossy(stdout);
        let diagnostic = if stderr.trim().is_empty() {
            stdout.trim()
        } else {
            stderr.trim()
        };

        if diagnostic.is_empty() {
            format!("{} {exit}", self.program)
        } else {
            format!(
                "{} {exit}: {}",
                self.program,
                truncate_output(diagnostic, self.max_diagnostic_bytes)
            )
        }
    }
}

#[async_trait]
impl TransformPort for ProcessTransformer {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn transform(&self, paths: &ArtifactPaths) -> Result<TransformOutcome, DomainError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&paths.input)
            .arg(&paths.output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so the deadline also reaches anything the program spawns.
        #[cfg(unix)]
        command.process_group(0);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let started = Instant::now();
        let mut child = command.spawn().map_err(|err| {
            DomainError::transform_failed(format!("failed to start {}: {err}", self.program))
        })?;
        let pid = child.id();
        tracing::debug!(program = %self.program, pid, "transformation process started");

        // Pipes are drained concurrently so a chatty child cannot block on a full buffer.
        let mut stdout_task = spawn_drain(child.stdout.take());
        let mut stderr_task = spawn_drain(child.stderr.take());

        // The deadline covers the drains too: a background process can hold the pipes open
        // after the program itself has exited.
        let finished = tokio::time::timeout(self.timeout, async {
            let status = child.wait().await;
            let stdout = (&mut stdout_task).await.unwrap_or_default();
            let stderr = (&mut stderr_task).await.unwrap_or_default();
            (status, stdout, stderr)
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(finished) => finished,
            Err(_) => {
                tracing::warn!(
                    program = %self.program,
                    pid,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "transformation deadline exceeded, killing process group"
                );
                kill_process_group(pid);
                // The program itself may already have exited with only the drains pending.
                if matches!(child.try_wait(), Ok(None)) {
                    if let Err(err) = child.kill().await {
                        tracing::warn!(pid, error = %err, "failed to kill transformation process");
                    }
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(DomainError::TransformTimeout {
                    after: self.timeout,
                });
            }
        };
        // Nothing the program left behind may outlive the request.
        kill_process_group(pid);

        let status = status.map_err(|err| {
            DomainError::transform_failed(format!("failed to wait for {}: {err}", self.program))
        })?;
        let elapsed = started.elapsed();

        if !status.success() {
            let details = self.failure_details(status, &stdout, &stderr);
            tracing::error!(
                program = %self.program,
                pid,
                exit_code = status.code(),
                elapsed_ms = elapsed.as_millis() as u64,
                details = %details,
                "transformation process failed"
            );
            return Err(DomainError::TransformFailed { details });
        }

        tracing::debug!(
            program = %self.program,
            pid,
            elapsed_ms = elapsed.as_millis() as u64,
            "transformation process exited successfully"
        );

        Ok(TransformOutcome {
            elapsed,
            diagnostics: truncate_output(
                String::from_utf8_lossy(&stdout).trim(),
                self.max_diagnostic_bytes,
            ),
        })
    }
}

fn spawn_drain<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(err) = pipe.read_to_end(&mut buffer).await {
                tracing::debug!(error = %err, "failed to read transformation output pipe");
            }
        }
        buffer
    })
}

/// Sends SIGKILL to every process in the group led by `pgid`. A group that is
/// already gone is not an error.
#[cfg(unix)]
fn kill_process_group(pgid: Option<u32>) {
    let Some(pgid) = pgid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: kill(2) only takes integers; a negative pid addresses the process group.
    #[allow(unsafe_code)]
    let result = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if result != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::warn!(pgid, error = %err, "failed to kill transformation process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: Option<u32>) {}

fn truncate_output(output: &str, max_bytes: usize) -> String {
    if output.len() <= max_bytes {
        return output.to_string();
    }
    let mut end = max_bytes;
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n[truncated: showing {}/{} bytes]",
        &output[..end],
        end,
        output.len()
    )
}
