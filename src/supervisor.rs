use std::time::Duration;

use log::{error, info, warn};
use tokio::time::sleep;

use crate::{config::ListenerSpec, runner, sink::Sink};

/// Retry policy of one supervised listener.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Attempts before the listener is abandoned
    pub max_retries: u32,

    /// Base duration of the exponential backoff: the sleep after failed
    /// attempt `n` (1-based) is `2^n` units
    pub backoff_unit: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Lifecycle of one supervised listener.
///
/// There is no path back from Abandoned or Done: a supervisor covers a
/// single run-to-completion-or-exhaustion lifecycle, never an auto-healing
/// loop, and the attempt counter is never reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    #[default]
    Idle,
    Running,
    Backoff,
    Abandoned,
    Done,
}

impl std::fmt::Display for ListenerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Backoff => write!(f, "Backoff"),
            Self::Abandoned => write!(f, "Abandoned"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Wraps one listener with bounded retry and exponential backoff.
pub struct Supervisor {
    spec: ListenerSpec,
    settings: Settings,
    state: ListenerState,
    attempts: u32,
}

impl Supervisor {
    /// Builds a new idle [Supervisor] for this listener.
    pub fn new(spec: ListenerSpec, settings: Settings) -> Self {
        Self {
            spec,
            settings,
            state: ListenerState::Idle,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Drives the listener until Done or Abandoned and returns the
    /// terminal state. Abandonment is logged, never escalated.
    pub async fn supervise(&mut self, sink: &dyn Sink) -> ListenerState {
        while self.attempts < self.settings.max_retries {
            self.state = ListenerState::Running;

            match runner::run(&self.spec, sink).await {
                Ok(()) => {
                    info!("listener {} completed", self.spec.host);
                    self.state = ListenerState::Done;
                    return self.state;
                },
                Err(e) => {
                    warn!(
                        "listener {} failed (attempt {}): {}",
                        self.spec.host,
                        self.attempts + 1,
                        e
                    );
                },
            }

            self.attempts += 1;
            self.state = ListenerState::Backoff;
            sleep(self.settings.backoff_unit * 2u32.saturating_pow(self.attempts)).await;
        }

        error!(
            "max retries reached for {}:{}. Giving up.",
            self.spec.host, self.spec.command
        );

        self.state = ListenerState::Abandoned;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Instant;

    use crate::sink::testing::CaptureSink;

    fn spec(command: &str) -> ListenerSpec {
        ListenerSpec {
            host: "test-site".to_string(),
            command: command.to_string(),
        }
    }

    fn settings(max_retries: u32) -> Settings {
        Settings {
            max_retries,
            backoff_unit: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn success_reaches_done_without_retry() {
        let sink = CaptureSink::default();
        let mut supervisor = Supervisor::new(spec("exit 0"), settings(5));

        assert_eq!(supervisor.state(), ListenerState::Idle);

        let state = supervisor.supervise(&sink).await;
        assert_eq!(state, ListenerState::Done);
        assert_eq!(supervisor.attempts(), 0);
    }

    #[tokio::test]
    async fn persistent_failure_reaches_abandoned() {
        let sink = CaptureSink::default();
        let mut supervisor = Supervisor::new(spec("exit 1"), settings(3));

        let started = Instant::now();
        let state = supervisor.supervise(&sink).await;
        let elapsed = started.elapsed();

        assert_eq!(state, ListenerState::Abandoned);
        assert_eq!(supervisor.state(), ListenerState::Abandoned);
        assert_eq!(supervisor.attempts(), 3);

        // backoff slept at least 2^1 + 2^2 + 2^3 units
        assert!(elapsed >= Duration::from_millis(2 + 4 + 8));
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let sink = CaptureSink::default();

        // fails until the marker file exists, which the first run creates
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("started").to_string_lossy().into_owned();
        let command = format!("test -f {m} && exit 0; touch {m}; exit 1", m = marker);

        let mut supervisor = Supervisor::new(spec(&command), settings(5));

        let state = supervisor.supervise(&sink).await;
        assert_eq!(state, ListenerState::Done);
        assert_eq!(supervisor.attempts(), 1);
    }

    #[tokio::test]
    async fn zero_retries_abandons_without_running() {
        let sink = CaptureSink::default();
        let mut supervisor = Supervisor::new(spec("exit 0"), settings(0));

        let state = supervisor.supervise(&sink).await;
        assert_eq!(state, ListenerState::Abandoned);
        assert_eq!(supervisor.attempts(), 0);
    }
}
