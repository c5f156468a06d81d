use hifitime::Epoch;

/// Unix timestamp of the GPS epoch (1980-01-06T00:00:00Z), in seconds.
pub const GPS_EPOCH_UNIX_SECS: i64 = 315_964_800;

/// Seconds per GPS week.
pub const SECS_PER_WEEK: i64 = 604_800;

/// Converts a GPS (week, millisecond of week) pair to a UTC timestamp
/// expressed in Unix nanoseconds.
///
/// The elapsed time is truncated to whole seconds before scaling, so
/// sub-second content of the millisecond field is discarded. No leap
/// second offset is applied: downstream consumers store this value as-is.
pub fn gps_to_utc(gps_week: u32, gps_millisecond: u64) -> i64 {
    let elapsed = gps_week as i64 * SECS_PER_WEEK + (gps_millisecond / 1000) as i64;
    (GPS_EPOCH_UNIX_SECS + elapsed) * 1_000_000_000
}

/// Renders a Unix nanosecond timestamp as an [Epoch], for logging only.
pub fn unix_nanos_epoch(nanos: i64) -> Epoch {
    Epoch::from_unix_seconds(nanos as f64 / 1.0E9)
}
