//! API Models
//!
//! Request and response bodies for the HTTP API, annotated for OpenAPI
//! generation with `utoipa`. Sensor keys match the ones the dashboard reads.

use krishi_core::{ChatReply, sensor::SensorSnapshot};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The latest readings as exposed over HTTP.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SensorData {
    #[schema(example = 28.5)]
    pub temperature: f64,
    #[schema(example = 65.0)]
    pub humidity: f64,
    /// Raw soil moisture (0-1023). Above 500 is dry.
    #[schema(example = 420)]
    pub soil: i64,
    pub gas: i64,
    pub rain: i64,
    /// 1 when the motor is running.
    #[schema(example = 0)]
    pub motor: i64,
    #[schema(example = "2025-01-15T10:30:00Z")]
    pub timestamp: String,
}

impl From<&SensorSnapshot> for SensorData {
    fn from(s: &SensorSnapshot) -> Self {
        Self {
            temperature: s.temperature,
            humidity: s.humidity,
            soil: s.soil_moisture,
            gas: s.gas_level,
            rain: s.rain_level,
            motor: s.motor_state,
            timestamp: s.observed_at.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ChatPayload {
    #[serde(default)]
    #[schema(example = "तापमान कितना है")]
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ChatResponse {
    pub response: String,
    pub sensor_data: Option<SensorData>,
    #[schema(example = "temperature")]
    pub intent: String,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            response: reply.text,
            sensor_data: reply.snapshot.as_ref().map(SensorData::from),
            intent: reply.intent.as_str().to_string(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct MotorPayload {
    /// 1 turns the motor on; any other value turns it off.
    #[serde(default)]
    #[schema(example = 1)]
    pub action: i64,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct MotorResponse {
    pub success: bool,
    #[schema(example = "Motor turned ON")]
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use krishi_core::intent::Intent;

    fn snapshot() -> SensorSnapshot {
        SensorSnapshot {
            temperature: 31.2,
            humidity: 48.0,
            soil_moisture: 610,
            gas_level: 220,
            rain_level: 15,
            motor_state: 1,
            observed_at: "2025-03-02T06:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_sensor_data_uses_dashboard_keys() {
        let json = serde_json::to_value(SensorData::from(&snapshot())).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "temperature": 31.2,
                "humidity": 48.0,
                "soil": 610,
                "gas": 220,
                "rain": 15,
                "motor": 1,
                "timestamp": "2025-03-02T06:00:00Z"
            })
        );
    }

    #[test]
    fn test_chat_response_from_reply() {
        let reply = ChatReply {
            text: "✅ मोटर चालू हो गई है!".to_string(),
            snapshot: Some(snapshot()),
            intent: Intent::MotorOn,
        };

        let response = ChatResponse::from(reply);

        assert_eq!(response.intent, "motor_on");
        assert_eq!(response.sensor_data, Some(SensorData::from(&snapshot())));
    }

    #[test]
    fn test_chat_response_without_snapshot_serializes_null() {
        let reply = ChatReply {
            text: "hi".to_string(),
            snapshot: None,
            intent: Intent::General,
        };

        let json = serde_json::to_value(ChatResponse::from(reply)).unwrap();

        assert!(json["sensor_data"].is_null());
        assert_eq!(json["intent"], "general");
    }

    #[test]
    fn test_payload_defaults() {
        let chat: ChatPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(chat.message, "");

        let motor: MotorPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(motor.action, 0);

        let motor: MotorPayload = serde_json::from_str(r#"{"action": 1}"#).unwrap();
        assert_eq!(motor.action, 1);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "No message provided".to_string(),
        };

        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, r#"{"message":"No message provided"}"#);
    }
}
