use std::process::Stdio;

use log::{error, info, warn};
use thiserror::Error;

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, BufReader},
    process::Command,
};

use crate::{collecter::Collecter, config::ListenerSpec, decoder, sink::Sink};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn \"{command}\": {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("listener stream error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("listener exited with code {code}")]
    NonZeroExit { code: i32 },
}

/// Runs one listener command to completion.
///
/// The command is spawned through a shell with the parent environment and
/// its stdout streamed line by line: each line is decoded, merged into the
/// run's own [Collecter], and every completed record is written to the
/// sink before the next line is read. Line-level problems (blank lines,
/// unknown keys, malformed values, sink write failures) are logged and
/// never abort the run; only spawn or stream faults and a non-zero exit
/// produce a [RunError].
pub async fn run(spec: &ListenerSpec, sink: &dyn Sink) -> Result<(), RunError> {
    info!("starting listener for {}:{}", spec.host, spec.command);

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(&spec.command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // a stream error early-returns below; without this the orphaned
        // listener would linger across every supervisor retry
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| RunError::Spawn {
            command: spec.command.clone(),
            source,
        })?;

    let Some(stdout) = child.stdout.take() else {
        return Err(RunError::Stream(std::io::Error::other(
            "listener stdout not captured",
        )));
    };

    // Drained concurrently so a chatty listener cannot fill the stderr
    // pipe while we block on stdout.
    let stderr = child.stderr.take();
    let stderr_task = tokio::spawn(async move {
        let mut content = String::new();
        if let Some(mut stderr) = stderr {
            let _ = stderr.read_to_string(&mut content).await;
        }
        content
    });

    let mut collecter = Collecter::new();
    let mut lines = BufReader::new(stdout).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        if line.is_empty() {
            warn!("empty response received from {}:{}", spec.host, spec.command);
            continue;
        }

        match decoder::decode(line) {
            Ok(Some(update)) => {
                if let Some(record) = collecter.ingest(update) {
                    if let Err(e) = sink.write(&record).await {
                        error!("{} - record dropped, sink error: {}", spec.host, e);
                    }
                }
            },
            Ok(None) => {},
            Err(e) => {
                warn!("{} - skipping line: {}", spec.host, e);
            },
        }
    }

    let status = child.wait().await?;
    let stderr_content = stderr_task.await.unwrap_or_default();

    if !status.success() {
        let code = status.code().unwrap_or(-1);

        error!(
            "process error for {}:{}: {}",
            spec.host,
            spec.command,
            stderr_content.trim_end()
        );

        return Err(RunError::NonZeroExit { code });
    }

    Ok(())
}
