use anise::constants::SPEED_OF_LIGHT_KM_S;

/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = SPEED_OF_LIGHT_KM_S * 1000.0;

/// Number of satellite slots within one constellation.
/// PRN are expected within [1, MAX_SAT].
pub const MAX_SAT: usize = 32;

/// Minimal number of vehicles to perform a measurement update
pub const MIN_SATELLITES: usize = 4;

/// Signal travel time (s) guessed on first Bancroft iteration
pub const BANCROFT_TRAVEL_TIME_S: f64 = 0.072;
