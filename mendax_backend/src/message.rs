use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{LieCategoryId, OraclePersona};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
}

/// User-assigned annotation state for a message.
///
/// The manual truth flag and the lie category are mutually exclusive by
/// construction: a message carries at most one of them, so contradictory
/// combinations cannot be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum Annotation {
    #[default]
    None,
    FlaggedTruth,
    Categorized(LieCategoryId),
}

impl Annotation {
    pub fn is_flagged_truth(self) -> bool {
        matches!(self, Annotation::FlaggedTruth)
    }

    pub fn lie_category(self) -> Option<LieCategoryId> {
        match self {
            Annotation::Categorized(category) => Some(category),
            _ => None,
        }
    }
}

/// One chat turn. `sender`, `text`, `timestamp` and `id` never change after
/// creation; `truth_reason` is write-once at append; only `annotation` is
/// user-mutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Persona active when the oracle generated this message. Absent for
    /// user messages and for the inert fallback appended on request failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<OraclePersona>,
    /// The oracle's self-report that it accidentally told the truth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth_reason: Option<String>,
    #[serde(default)]
    pub annotation: Annotation,
}

impl ChatMessage {
    pub fn persona_id(&self) -> Option<&str> {
        self.persona.as_ref().map(|p| p.id.as_str())
    }

    pub fn is_self_flagged(&self) -> bool {
        self.truth_reason.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_defaults_to_none_when_absent() {
        let json = r#"{
            "id": 1,
            "sender": "user",
            "text": "hello",
            "timestamp": "2026-08-29T12:00:00Z"
        }"#;
        let msg: ChatMessage = serde_json::from_str(json).expect("deserialize");
        assert_eq!(msg.annotation, Annotation::None);
        assert!(msg.persona.is_none());
        assert!(!msg.is_self_flagged());
    }

    #[test]
    fn categorized_annotation_serializes_tagged() {
        let annotation = Annotation::Categorized(LieCategoryId::Fabrication);
        let json = serde_json::to_string(&annotation).expect("serialize");
        assert_eq!(json, r#"{"kind":"categorized","category":"fabrication"}"#);
        let back: Annotation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, annotation);
    }
}
