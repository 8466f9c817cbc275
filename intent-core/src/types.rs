//! Core types shared by the classifier and the dispatcher

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete action category assigned to an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Exit,
    SetTimer,
    VolumeUp,
    VolumeDown,
    OpenCalculator,
    OpenNotepad,
    SearchYoutube,
    SearchGoogle,
    SearchNaver,
    /// Total fallback, never an error
    Unknown,
}

impl Intent {
    /// Get all intents in declaration order
    pub fn all() -> &'static [Intent] {
        &[
            Intent::Exit,
            Intent::SetTimer,
            Intent::VolumeUp,
            Intent::VolumeDown,
            Intent::OpenCalculator,
            Intent::OpenNotepad,
            Intent::SearchYoutube,
            Intent::SearchGoogle,
            Intent::SearchNaver,
            Intent::Unknown,
        ]
    }

    /// Wire label, e.g. `SET_TIMER`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exit => "EXIT",
            Self::SetTimer => "SET_TIMER",
            Self::VolumeUp => "VOLUME_UP",
            Self::VolumeDown => "VOLUME_DOWN",
            Self::OpenCalculator => "OPEN_CALCULATOR",
            Self::OpenNotepad => "OPEN_NOTEPAD",
            Self::SearchYoutube => "SEARCH_YOUTUBE",
            Self::SearchGoogle => "SEARCH_GOOGLE",
            Self::SearchNaver => "SEARCH_NAVER",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether this intent carries a search query parameter
    pub fn is_search(&self) -> bool {
        matches!(
            self,
            Self::SearchYoutube | Self::SearchGoogle | Self::SearchNaver
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intent-specific payload
///
/// Serialized untagged so results read as `{"intent": "SET_TIMER", "parameter": 5}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameter {
    #[default]
    None,
    /// Timer length in minutes, always positive
    Minutes(u32),
    /// Percent-encoded search query, may be empty
    Query(String),
}

impl Parameter {
    pub fn is_none(&self) -> bool {
        matches!(self, Parameter::None)
    }

    pub fn minutes(&self) -> Option<u32> {
        match self {
            Parameter::Minutes(m) => Some(*m),
            _ => None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Parameter::Query(q) => Some(q),
            _ => None,
        }
    }
}

/// Outcome of classifying one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    #[serde(default)]
    pub parameter: Parameter,
}

impl ClassificationResult {
    pub fn new(intent: Intent, parameter: Parameter) -> Self {
        Self { intent, parameter }
    }

    /// Result for an utterance no rule recognized
    pub fn unknown() -> Self {
        Self::new(Intent::Unknown, Parameter::None)
    }

    /// Serialize to the JSON shape handed to host applications
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"intent":"UNKNOWN","parameter":null}"#.to_string())
    }
}

/// System applications the assistant can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum App {
    Calculator,
    Notepad,
}

impl App {
    /// Map a launch intent to the app it opens
    pub fn for_intent(intent: Intent) -> Option<Self> {
        match intent {
            Intent::OpenCalculator => Some(App::Calculator),
            Intent::OpenNotepad => Some(App::Notepad),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            App::Calculator => "calculator",
            App::Notepad => "notepad",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_labels_match_serde() {
        for intent in Intent::all() {
            let json = serde_json::to_string(intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }

    #[test]
    fn test_result_json_shape() {
        let timer = ClassificationResult::new(Intent::SetTimer, Parameter::Minutes(5));
        assert_eq!(timer.to_json(), r#"{"intent":"SET_TIMER","parameter":5}"#);

        let exit = ClassificationResult::new(Intent::Exit, Parameter::None);
        assert_eq!(exit.to_json(), r#"{"intent":"EXIT","parameter":null}"#);

        let search =
            ClassificationResult::new(Intent::SearchNaver, Parameter::Query("a%20b".to_string()));
        assert_eq!(
            search.to_json(),
            r#"{"intent":"SEARCH_NAVER","parameter":"a%20b"}"#
        );
    }

    #[test]
    fn test_result_deserializes_back() {
        let parsed: ClassificationResult =
            serde_json::from_str(r#"{"intent":"SET_TIMER","parameter":12}"#).unwrap();
        assert_eq!(parsed.parameter.minutes(), Some(12));

        let parsed: ClassificationResult =
            serde_json::from_str(r#"{"intent":"UNKNOWN"}"#).unwrap();
        assert!(parsed.parameter.is_none());
    }

    #[test]
    fn test_app_for_intent() {
        assert_eq!(App::for_intent(Intent::OpenCalculator), Some(App::Calculator));
        assert_eq!(App::for_intent(Intent::OpenNotepad), Some(App::Notepad));
        assert_eq!(App::for_intent(Intent::VolumeUp), None);
    }
}
