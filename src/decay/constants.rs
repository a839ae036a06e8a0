/// Earth's standard gravitational parameter, m³/s².
pub const GM_EARTH_M3_S2: f64 = 3.986_004_418e14;
/// Mean Earth radius used for the altitude estimate, m.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
