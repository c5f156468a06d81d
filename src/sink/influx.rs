use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::{
    collecter::record::PositionRecord,
    config::InfluxParams,
    sink::{Sink, SinkError},
};

/// InfluxDB 1.x measurement receiving every position record.
const MEASUREMENT: &str = "gps_position";

/// Line-protocol writer against the InfluxDB 1.x `/write` endpoint.
pub struct InfluxSink {
    client: Client,
    write_url: String,
    query: Vec<(String, String)>,
}

impl InfluxSink {
    /// Builds a new [InfluxSink] from connection parameters. No network
    /// traffic happens until the first write.
    pub fn new(params: &InfluxParams) -> Self {
        let write_url = format!("http://{}:{}/write", params.host, params.port);

        let query = vec![
            ("db".to_string(), params.db_name.clone()),
            ("u".to_string(), params.user.clone()),
            ("p".to_string(), params.pass.clone()),
        ];

        Self {
            client: Client::new(),
            write_url,
            query,
        }
    }
}

#[async_trait]
impl Sink for InfluxSink {
    async fn write(&self, record: &PositionRecord) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.write_url)
            .query(&self.query)
            .body(to_line_protocol(record))
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("record sent to influxdb: {}", record);

        Ok(())
    }
}

/// Renders one record as an InfluxDB line-protocol point.
///
/// The point carries no explicit timestamp: the server assigns reception
/// time, while the GPS solution time travels in the `gps_datetime` field.
pub fn to_line_protocol(record: &PositionRecord) -> String {
    format!(
        "{},site={} gps_datetime={}i,satellite_number={}i,\
         position_x={},position_y={},position_z={},\
         position_e={},position_n={},position_u={}",
        MEASUREMENT,
        escape_tag_value(&record.site_id),
        record.gps_datetime,
        record.satellite_number,
        record.position_x,
        record.position_y,
        record.position_z,
        record.position_e,
        record.position_n,
        record.position_u,
    )
}

/// Tag values must escape commas, spaces and equal signs.
fn escape_tag_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        if matches!(c, ',' | ' ' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
