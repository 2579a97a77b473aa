//! Intent Classification
//!
//! Maps free text to one of a closed set of intents using an ordered table of
//! Hindi and English trigger phrases. The first group with a matching trigger
//! wins, so a message that mentions both "motor on" and "status" turns the
//! motor on.

use std::fmt;

/// The purpose of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    MotorOn,
    MotorOff,
    Status,
    Temperature,
    Humidity,
    Soil,
    Chart,
    Advice,
    General,
}

impl Intent {
    /// The wire tag reported back to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::MotorOn => "motor_on",
            Intent::MotorOff => "motor_off",
            Intent::Status => "status",
            Intent::Temperature => "temperature",
            Intent::Humidity => "humidity",
            Intent::Soil => "soil",
            Intent::Chart => "chart",
            Intent::Advice => "advice",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger groups in priority order. Triggers must be lower-case.
pub const KEYWORD_TABLE: &[(Intent, &[&str])] = &[
    (
        Intent::MotorOn,
        &["मोटर चालू", "motor on", "start motor", "पानी दो"],
    ),
    (
        Intent::MotorOff,
        &["मोटर बंद", "motor off", "stop motor", "पानी बंद"],
    ),
    (Intent::Status, &["status", "स्थिति", "कैसा है", "क्या हाल"]),
    (Intent::Temperature, &["तापमान", "temperature", "गर्मी"]),
    (Intent::Humidity, &["नमी", "humidity"]),
    (Intent::Soil, &["मिट्टी", "soil", "जमीन"]),
    (
        Intent::Chart,
        &["ग्राफ", "चार्ट", "chart", "graph", "visualization"],
    ),
    (Intent::Advice, &["सलाह", "advice", "मदद", "help"]),
];

/// Classifies a message. Never fails; unmatched text is `Intent::General`.
pub fn classify(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|trigger| lowered.contains(trigger)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}
