use std::sync::Arc;

use log::{error, info};

use crate::{
    config::ListenerSpec,
    sink::Sink,
    supervisor::{ListenerState, Settings, Supervisor},
};

/// Launches one supervised listener per spec and waits for all of them.
///
/// Every listener runs in its own task with no shared mutable state; the
/// sink handle is the only thing they have in common. Returns the terminal
/// state of each listener, in spec order. A panicking task is contained
/// and reported as Abandoned; the rest of the fleet is unaffected.
pub async fn run_fleet(
    specs: Vec<ListenerSpec>,
    sink: Arc<dyn Sink>,
    settings: Settings,
) -> Vec<(String, ListenerState)> {
    info!("deploying {} listener(s)", specs.len());

    let mut handles = Vec::with_capacity(specs.len());

    for spec in specs {
        let sink = sink.clone();
        let settings = settings.clone();
        let host = spec.host.clone();

        let handle = tokio::spawn(async move {
            let mut supervisor = Supervisor::new(spec, settings);
            supervisor.supervise(sink.as_ref()).await
        });

        handles.push((host, handle));
    }

    let mut states = Vec::with_capacity(handles.len());

    for (host, handle) in handles {
        match handle.await {
            Ok(state) => {
                info!("listener {} terminated: {}", host, state);
                states.push((host, state));
            },
            Err(e) => {
                error!("listener task for {} panicked: {}", host, e);
                states.push((host, ListenerState::Abandoned));
            },
        }
    }

    states
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::sink::testing::CaptureSink;

    fn settings() -> Settings {
        Settings {
            max_retries: 2,
            backoff_unit: Duration::from_millis(1),
        }
    }

    /// Shell command printing one full record cycle for `site`.
    fn record_cycle(site: &str) -> String {
        [
            format!("echo 'site_id = {}'", site),
            "echo 'gps_week = 2200'".to_string(),
            "echo 'gps_millisecond = 345600000'".to_string(),
            "echo 'Real-time XYZ (m) = 1.0,2.0,3.0'".to_string(),
            "echo 'Satellite number = 12'".to_string(),
            "echo 'Real-time ENU (cm) = 0.1,0.2,0.3'".to_string(),
        ]
        .join("; ")
    }

    #[tokio::test]
    async fn waits_for_every_listener() {
        let sink = Arc::new(CaptureSink::default());

        let specs = (0..4)
            .map(|i| ListenerSpec {
                host: format!("site-{}", i),
                command: record_cycle(&format!("SIT{}", i)),
            })
            .collect();

        let states = run_fleet(specs, sink.clone(), settings()).await;

        assert_eq!(states.len(), 4);
        for (_, state) in &states {
            assert_eq!(*state, ListenerState::Done);
        }

        // one record per site, all delivered by the time the fleet returns
        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 4);

        let mut sites: Vec<&str> = records.iter().map(|r| r.site_id.as_str()).collect();
        sites.sort();
        assert_eq!(sites, vec!["SIT0", "SIT1", "SIT2", "SIT3"]);
    }

    #[tokio::test]
    async fn one_abandoned_listener_does_not_affect_the_rest() {
        let sink = Arc::new(CaptureSink::default());

        let specs = vec![
            ListenerSpec {
                host: "healthy".to_string(),
                command: record_cycle("GOOD"),
            },
            ListenerSpec {
                host: "broken".to_string(),
                command: "exit 1".to_string(),
            },
        ];

        let states = run_fleet(specs, sink.clone(), settings()).await;

        assert_eq!(states[0], ("healthy".to_string(), ListenerState::Done));
        assert_eq!(states[1], ("broken".to_string(), ListenerState::Abandoned));

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].site_id, "GOOD");
    }

    #[tokio::test]
    async fn empty_fleet_returns_immediately() {
        let sink = Arc::new(CaptureSink::default());
        let states = run_fleet(Vec::new(), sink, settings()).await;
        assert!(states.is_empty());
    }
}
