use log::trace;

use crate::{
    decoder::FieldUpdate,
    utils::{gps_to_utc, unix_nanos_epoch},
};

pub mod record;

use record::PositionRecord;

/// Collects [FieldUpdate]s into complete [PositionRecord]s.
///
/// Holds exactly one in-progress record: one optional slot per field kind,
/// merged last-write-wins. The slots are cleared on every emission, so a
/// collecter never carries state across two complete records.
#[derive(Debug, Default)]
pub struct Collecter {
    site_id: Option<String>,
    gps_week: Option<u32>,
    gps_millisecond: Option<u64>,
    xyz: Option<[f64; 3]>,
    satellite_number: Option<u32>,
    enu: Option<[f64; 3]>,
}

impl Collecter {
    /// Builds a new [Collecter] with an empty partial record.
    pub fn new() -> Self {
        Default::default()
    }

    /// Merges one update, returning the finalized [PositionRecord] when
    /// this update completes the set of required fields.
    pub fn ingest(&mut self, update: FieldUpdate) -> Option<PositionRecord> {
        match update {
            FieldUpdate::SiteId(site_id) => self.site_id = Some(site_id),
            FieldUpdate::GpsWeek(week) => self.gps_week = Some(week),
            FieldUpdate::GpsMillisecond(millis) => self.gps_millisecond = Some(millis),
            FieldUpdate::Xyz(xyz) => self.xyz = Some(xyz),
            FieldUpdate::SatelliteNumber(count) => self.satellite_number = Some(count),
            FieldUpdate::Enu(enu) => self.enu = Some(enu),
        }

        if !self.is_complete() {
            return None;
        }

        let record = self.finalize();

        trace!(
            "{} - complete record: {}",
            unix_nanos_epoch(record.gps_datetime),
            record
        );

        Some(record)
    }

    /// True if all six required field kinds have been observed.
    pub fn is_complete(&self) -> bool {
        self.site_id.is_some()
            && self.gps_week.is_some()
            && self.gps_millisecond.is_some()
            && self.xyz.is_some()
            && self.satellite_number.is_some()
            && self.enu.is_some()
    }

    /// True if no field has been observed since the last emission.
    pub fn is_empty(&self) -> bool {
        self.site_id.is_none()
            && self.gps_week.is_none()
            && self.gps_millisecond.is_none()
            && self.xyz.is_none()
            && self.satellite_number.is_none()
            && self.enu.is_none()
    }

    /// Drains the (complete) slots into a [PositionRecord].
    /// Only called once [Self::is_complete] holds.
    fn finalize(&mut self) -> PositionRecord {
        let gps_week = self.gps_week.take().unwrap_or_default();
        let gps_millisecond = self.gps_millisecond.take().unwrap_or_default();
        let [x, y, z] = self.xyz.take().unwrap_or_default();
        let [e, n, u] = self.enu.take().unwrap_or_default();

        PositionRecord {
            site_id: self.site_id.take().unwrap_or_default(),
            gps_datetime: gps_to_utc(gps_week, gps_millisecond),
            satellite_number: self.satellite_number.take().unwrap_or_default(),
            position_x: x,
            position_y: y,
            position_z: z,
            position_e: e,
            position_n: n,
            position_u: u,
        }
    }
}
