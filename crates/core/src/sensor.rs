//! Sensor Readings
//!
//! This module defines the `SensorSnapshot` value read from the telemetry store
//! and the label rules shared by every reply that renders it.

/// Soil readings strictly above this value are reported as dry.
pub const DRY_SOIL_THRESHOLD: i64 = 500;

/// The most recent set of readings from the field deployment.
///
/// A snapshot is fetched fresh for every request and never mutated. Lower
/// `soil_moisture` values mean wetter soil.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Raw soil moisture on the 0-1023 ADC scale.
    pub soil_moisture: i64,
    pub gas_level: i64,
    pub rain_level: i64,
    /// `1` while the irrigation motor runs. Any other value means off.
    pub motor_state: i64,
    /// Timestamp exactly as reported by the telemetry store.
    pub observed_at: String,
}

impl SensorSnapshot {
    /// Checks the soil reading against the dry threshold.
    pub fn soil_is_dry(&self) -> bool {
        self.soil_moisture > DRY_SOIL_THRESHOLD
    }

    pub fn motor_is_on(&self) -> bool {
        self.motor_state == 1
    }

    /// Localized on/off label for the motor.
    pub fn motor_label(&self) -> &'static str {
        if self.motor_is_on() { "चालू" } else { "बंद" }
    }
}

/// Renders a float reading so it always carries a fractional part.
///
/// `28.0` stays `28.0` instead of collapsing to `28`, which keeps replies
/// consistent with what the field dashboard shows.
pub fn format_reading(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
pub(crate) fn sample_snapshot() -> SensorSnapshot {
    SensorSnapshot {
        temperature: 28.5,
        humidity: 65.0,
        soil_moisture: 420,
        gas_level: 130,
        rain_level: 0,
        motor_state: 0,
        observed_at: "2025-01-15T10:30:00Z".to_string(),
    }
}
