/// One finalized position record, ready for the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    /// Geodetic site identifier
    pub site_id: String,

    /// UTC timestamp in Unix nanoseconds
    pub gps_datetime: i64,

    /// Satellites used in the solution
    pub satellite_number: u32,

    /// ECEF position (m)
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,

    /// Local tangent plane position (cm)
    pub position_e: f64,
    pub position_n: f64,
    pub position_u: f64,
}

impl std::fmt::Display for PositionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} sats={} xyz=({:.4},{:.4},{:.4}) enu=({:.4},{:.4},{:.4})",
            self.site_id,
            self.satellite_number,
            self.position_x,
            self.position_y,
            self.position_z,
            self.position_e,
            self.position_n,
            self.position_u,
        )
    }
}
