//! Telemetry Store Access
//!
//! This module reads the latest sensor entry from a ThingSpeak channel and
//! writes the irrigation motor field. Both operations are best-effort: any
//! failure is logged and downgraded to an absent snapshot or a `false`
//! acknowledgement, so callers never have to handle transport errors.

use crate::sensor::SensorSnapshot;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Channel slot holding the motor state. Also the slot commands are written to.
pub const MOTOR_FIELD: &str = "field6";

/// Errors raised while talking to the telemetry store.
///
/// These never leave this module's `TelemetryStore` implementations.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("telemetry request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("telemetry feed is malformed: {0}")]
    Malformed(String),
    #[error("telemetry feed has no entries")]
    Empty,
}

/// A binary command for the irrigation motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    On,
    Off,
}

impl MotorCommand {
    /// Maps the `/motor` action flag: `1` is on, anything else is off.
    pub fn from_action(action: i64) -> Self {
        if action == 1 { Self::On } else { Self::Off }
    }

    /// The value written to the motor field.
    pub fn field_value(&self) -> u8 {
        match self {
            MotorCommand::On => 1,
            MotorCommand::Off => 0,
        }
    }
}

/// Defines the contract for reading sensors and driving the actuator.
///
/// Implementations must not fail: a missing reading is `None` and a failed
/// write is `false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Fetches the most recent entry of the channel.
    async fn latest_snapshot(&self) -> Option<SensorSnapshot>;

    /// Writes the motor field and reports whether the store acknowledged it.
    async fn set_motor(&self, command: MotorCommand) -> bool;
}

/// Static connection settings for a ThingSpeak channel.
#[derive(Debug, Clone)]
pub struct ThingSpeakConfig {
    pub base_url: String,
    pub channel_id: String,
    pub read_api_key: String,
    pub write_api_key: String,
}

/// A `TelemetryStore` backed by the ThingSpeak REST API.
pub struct ThingSpeakClient {
    http: reqwest::Client,
    config: ThingSpeakConfig,
}

impl ThingSpeakClient {
    pub fn new(config: ThingSpeakConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn fetch_latest(&self) -> Result<SensorSnapshot, TelemetryError> {
        let url = self.url(&format!("channels/{}/feeds.json", self.config.channel_id));
        let body: Value = self
            .http
            .get(url)
            .query(&[("api_key", self.config.read_api_key.as_str()), ("results", "1")])
            .send()
            .await?
            .json()
            .await?;
        parse_feed(body)
    }

    async fn write_motor(&self, command: MotorCommand) -> Result<bool, TelemetryError> {
        let body = self
            .http
            .get(self.url("update"))
            .query(&[
                ("api_key", self.config.write_api_key.clone()),
                (MOTOR_FIELD, command.field_value().to_string()),
            ])
            .send()
            .await?
            .text()
            .await?;
        debug!(?command, response = %body, "Motor write answered");
        Ok(is_acknowledged(&body))
    }
}

#[async_trait]
impl TelemetryStore for ThingSpeakClient {
    async fn latest_snapshot(&self) -> Option<SensorSnapshot> {
        match self.fetch_latest().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(channel = %self.config.channel_id, error = %e, "Could not fetch sensor data");
                None
            }
        }
    }

    async fn set_motor(&self, command: MotorCommand) -> bool {
        match self.write_motor(command).await {
            Ok(acknowledged) => {
                if !acknowledged {
                    warn!(?command, "Telemetry store rejected the motor write");
                }
                acknowledged
            }
            Err(e) => {
                warn!(?command, error = %e, "Could not control motor");
                false
            }
        }
    }
}

#[derive(Deserialize)]
struct FeedResponse {
    feeds: Vec<Map<String, Value>>,
}

/// Converts a `feeds.json` body into the newest snapshot.
fn parse_feed(body: Value) -> Result<SensorSnapshot, TelemetryError> {
    let response: FeedResponse =
        serde_json::from_value(body).map_err(|e| TelemetryError::Malformed(e.to_string()))?;
    let latest = response.feeds.first().ok_or(TelemetryError::Empty)?;

    Ok(SensorSnapshot {
        temperature: float_field(latest, "field1")?,
        humidity: float_field(latest, "field2")?,
        soil_moisture: int_field(latest, "field3")?,
        gas_level: int_field(latest, "field4")?,
        rain_level: int_field(latest, "field5")?,
        motor_state: int_field(latest, MOTOR_FIELD)?,
        observed_at: latest
            .get("created_at")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

// A slot the channel never wrote reads as zero; an explicit null does not.
fn float_field(entry: &Map<String, Value>, name: &str) -> Result<f64, TelemetryError> {
    let parsed = match entry.get(name) {
        None => Some(0.0),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => None,
    };
    parsed.ok_or_else(|| malformed_field(entry, name))
}

fn int_field(entry: &Map<String, Value>, name: &str) -> Result<i64, TelemetryError> {
    let parsed = match entry.get(name) {
        None => Some(0),
        Some(Value::String(raw)) => raw.trim().parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(_) => None,
    };
    parsed.ok_or_else(|| malformed_field(entry, name))
}

fn malformed_field(entry: &Map<String, Value>, name: &str) -> TelemetryError {
    TelemetryError::Malformed(format!(
        "{name} has unusable value {}",
        entry.get(name).unwrap_or(&Value::Null)
    ))
}

/// ThingSpeak answers an update with the new entry id, or `0` on rejection.
///
/// Only a positive entry id counts as success; error pages and other text do not.
fn is_acknowledged(body: &str) -> bool {
    body.trim().parse::<u64>().map(|entry| entry > 0).unwrap_or(false)
}
