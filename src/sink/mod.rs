use async_trait::async_trait;
use thiserror::Error;

use crate::collecter::record::PositionRecord;

pub mod influx;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("write rejected: {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Write target for finalized [PositionRecord]s.
///
/// Shared by every listener in the fleet, so implementations must be safe
/// for concurrent use. A failed write is reported to the caller and the
/// record is dropped; the sink is never asked to retry.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, record: &PositionRecord) -> Result<(), SinkError>;
}

/// Sink that only logs, for `--dry-run` operation.
pub struct NullSink;

#[async_trait]
impl Sink for NullSink {
    async fn write(&self, record: &PositionRecord) -> Result<(), SinkError> {
        log::info!("dry-run: {}", record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_sink_accepts_every_record() {
        let record = PositionRecord {
            site_id: "ABC1".to_string(),
            gps_datetime: 1_646_438_400_000_000_000,
            satellite_number: 12,
            position_x: 1.0,
            position_y: 2.0,
            position_z: 3.0,
            position_e: 0.1,
            position_n: 0.2,
            position_u: 0.3,
        };

        NullSink.write(&record).await.unwrap();
    }
}
