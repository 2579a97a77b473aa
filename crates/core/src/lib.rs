pub mod composer;
pub mod intent;
pub mod llm_client;
pub mod sensor;
pub mod telemetry;

use intent::Intent;
use sensor::SensorSnapshot;

/// The outcome of handling one chat message.
///
/// Carries the snapshot the reply was based on so callers can show the same
/// readings next to the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub snapshot: Option<SensorSnapshot>,
    pub intent: Intent,
}
