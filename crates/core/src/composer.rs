//! Response Composition
//!
//! Turns a classified intent and the current sensor snapshot into the reply
//! text. Motor intents drive the actuator, sensor intents render templated
//! reports, and everything else (or any sensor intent without readings) is
//! delegated to the language model so the user always gets an answer.

use crate::{
    ChatReply,
    intent::{Intent, classify},
    llm_client::{self, LanguageModel},
    sensor::{SensorSnapshot, format_reading},
    telemetry::{MotorCommand, TelemetryStore},
};
use std::sync::Arc;
use tracing::info;

/// Reply for the chart intent. The page itself is served by the web front-end.
pub const CHART_POINTER: &str = "📊 यहाँ आपका डेटा विज़ुअलाइज़ेशन देखें:\n👉 /chart.html\n\nआप देख सकते हैं:\n- तापमान ट्रेंड\n- नमी का ग्राफ\n- मिट्टी की नमी\n- सभी सेंसर की तुलना";

/// Composes replies for one chat message at a time. Holds no per-request state.
pub struct ResponseComposer {
    telemetry: Arc<dyn TelemetryStore>,
    model: Arc<dyn LanguageModel>,
    system_prompt: Arc<String>,
}

impl ResponseComposer {
    pub fn new(
        telemetry: Arc<dyn TelemetryStore>,
        model: Arc<dyn LanguageModel>,
        system_prompt: Arc<String>,
    ) -> Self {
        Self {
            telemetry,
            model,
            system_prompt,
        }
    }

    /// Handles a chat message end to end: fetch, classify, compose.
    pub async fn reply(&self, message: &str) -> ChatReply {
        let snapshot = self.telemetry.latest_snapshot().await;
        let intent = classify(message);
        info!(%intent, has_snapshot = snapshot.is_some(), "Classified chat message");

        let text = self.compose(intent, message, snapshot.as_ref()).await;
        ChatReply {
            text,
            snapshot,
            intent,
        }
    }

    /// Produces the reply text for an already classified message.
    pub async fn compose(
        &self,
        intent: Intent,
        message: &str,
        snapshot: Option<&SensorSnapshot>,
    ) -> String {
        match (intent, snapshot) {
            (Intent::MotorOn, _) => self.switch_motor(MotorCommand::On).await,
            (Intent::MotorOff, _) => self.switch_motor(MotorCommand::Off).await,
            (Intent::Status, Some(s)) => status_report(s),
            (Intent::Temperature, Some(s)) => {
                format!("🌡️ अभी तापमान {}°C है।", format_reading(s.temperature))
            }
            (Intent::Humidity, Some(s)) => {
                format!("💧 अभी नमी {}% है।", format_reading(s.humidity))
            }
            (Intent::Soil, Some(s)) => {
                let condition = if s.soil_is_dry() { "सूखी है" } else { "अच्छी है" };
                format!("🌿 मिट्टी की नमी {} है। मिट्टी {}।", s.soil_moisture, condition)
            }
            (Intent::Chart, _) => CHART_POINTER.to_string(),
            _ => {
                llm_client::generate(self.model.as_ref(), &self.system_prompt, snapshot, message)
                    .await
            }
        }
    }

    async fn switch_motor(&self, command: MotorCommand) -> String {
        let success = self.telemetry.set_motor(command).await;
        info!(?command, success, "Motor command sent");
        match (command, success) {
            (MotorCommand::On, true) => "✅ मोटर चालू हो गई है!",
            (MotorCommand::On, false) => "❌ मोटर चालू करने में समस्या आई।",
            (MotorCommand::Off, true) => "✅ मोटर बंद हो गई है!",
            (MotorCommand::Off, false) => "❌ मोटर बंद करने में समस्या आई।",
        }
        .to_string()
    }
}

fn status_report(s: &SensorSnapshot) -> String {
    let soil_label = if s.soil_is_dry() { "(सूखी)" } else { "(अच्छी)" };
    format!(
        "📊 आपके खेत की स्थिति:\n\n\
         🌡️ तापमान: {}°C\n\
         💧 नमी: {}%\n\
         🌿 मिट्टी: {} {}\n\
         💨 गैस: {}\n\
         🌧️ बारिश: {}\n\
         ⚙️ मोटर: {}",
        format_reading(s.temperature),
        format_reading(s.humidity),
        s.soil_moisture,
        soil_label,
        s.gas_level,
        s.rain_level,
        s.motor_label(),
    )
}
