//! Delegates that turn an analysis request into a report

use std::process::Stdio;

use futures::future::BoxFuture;
use tokio::io::AsyncWriteExt;

use super::{AnalysisReport, AnalysisRequest};
use crate::error::{Error, Result};

/// External analysis service. Holds its own credentials; the core never sees them.
pub trait AnalysisDelegate: Send + Sync {
    fn analyze(&self, request: AnalysisRequest) -> BoxFuture<'static, Result<AnalysisReport>>;
}

/// Runs a local program that reads the request JSON on stdin and prints the
/// report JSON on stdout
#[derive(Clone, Debug)]
pub struct CommandDelegate {
    program: String,
    args: Vec<String>,
}

impl CommandDelegate {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl AnalysisDelegate for CommandDelegate {
    fn analyze(&self, request: AnalysisRequest) -> BoxFuture<'static, Result<AnalysisReport>> {
        let program = self.program.clone();
        let args = self.args.clone();
        Box::pin(async move {
            let payload = serde_json::to_vec(&request)
                .map_err(|e| Error::Delegate(format!("cannot encode request: {e}")))?;

            log::info!("Running analysis delegate '{}' ({:?})", program, request.mode);
            let mut child = tokio::process::Command::new(&program)
                .args(&args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| Error::Delegate(format!("failed to run {program}: {e}")))?;

            // Feed stdin while draining stdout and stderr so neither pipe can fill up
            let stdin = child.stdin.take();
            let send = async move {
                match stdin {
                    Some(mut stdin) => stdin.write_all(&payload).await,
                    None => Ok(()),
                }
            };
            let (sent, output) = tokio::join!(send, child.wait_with_output());
            let output =
                output.map_err(|e| Error::Delegate(format!("{program} did not finish: {e}")))?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(Error::Delegate(format!(
                    "{program} exited with {}: {}",
                    output.status,
                    stderr.trim()
                )));
            }
            if let Err(err) = sent {
                // The delegate may answer without reading the whole request
                log::warn!("{} closed stdin early: {}", program, err);
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            AnalysisReport::parse(request.mode, stdout.trim())
        })
    }
}
