//! Reporting thresholds, overridable from `cfg.toml` at build time.
//!
//! * `temperature_delta`, `humidity_delta`, `pressure_delta`: a value is
//!   reported once it moved by more than this since it was last reported.
//! * `color_distance`: colour is reported once the Euclidean RGB distance
//!   reaches this value.
//! * `send_attempts`: tries per report before tracked values are forgotten.

#[toml_cfg::toml_config]
pub struct Config {
    #[default(1)]
    pub temperature_delta: u32,
    #[default(1)]
    pub humidity_delta: u32,
    #[default(1)]
    pub pressure_delta: u32,
    #[default(150)]
    pub color_distance: u32,
    #[default(3)]
    pub send_attempts: u32,
}
