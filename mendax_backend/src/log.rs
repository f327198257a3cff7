use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::catalog::OraclePersona;
use crate::message::{Annotation, ChatMessage, Sender};

/// The result of patching one message's annotation. Carries what the tracker
/// needs to settle counters without re-reading the log.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationChange {
    pub previous: Annotation,
    pub current: Annotation,
    pub persona_id: Option<String>,
}

/// Append-only ordered sequence of chat messages. Messages are never deleted
/// or reordered; only their annotation field may change after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn find(&self, id: i64) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> i64 {
        self.push(Sender::User, text.into(), None, None)
    }

    pub fn append_ai(
        &mut self,
        text: impl Into<String>,
        persona: OraclePersona,
        truth_reason: Option<String>,
    ) -> i64 {
        self.push(Sender::Ai, text.into(), Some(persona), truth_reason)
    }

    /// Append the fallback message shown when the oracle request fails. It
    /// renders as an AI bubble but carries no persona and no truth semantics.
    pub fn append_inert(&mut self, text: impl Into<String>) -> i64 {
        self.push(Sender::Ai, text.into(), None, None)
    }

    /// Replace one message's annotation. Returns `None` when `id` is unknown,
    /// leaving the log untouched.
    pub fn set_annotation(&mut self, id: i64, annotation: Annotation) -> Option<AnnotationChange> {
        let msg = self.messages.iter_mut().find(|m| m.id == id)?;
        let previous = msg.annotation;
        msg.annotation = annotation;
        Some(AnnotationChange {
            previous,
            current: annotation,
            persona_id: msg.persona.as_ref().map(|p| p.id.clone()),
        })
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(
        &mut self,
        sender: Sender,
        text: String,
        persona: Option<OraclePersona>,
        truth_reason: Option<String>,
    ) -> i64 {
        let now = Utc::now();
        // Creation-time-derived ids, forced strictly increasing so two
        // appends inside one millisecond still order correctly.
        let id = match self.messages.last() {
            Some(last) => now.timestamp_millis().max(last.id + 1),
            None => now.timestamp_millis(),
        };
        self.messages.push(ChatMessage {
            id,
            sender,
            text,
            timestamp: now,
            persona,
            truth_reason,
            annotation: Annotation::None,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{persona_by_id, LieCategoryId};

    fn normal() -> OraclePersona {
        persona_by_id("normal").expect("builtin persona")
    }

    #[test]
    fn ids_are_strictly_increasing_even_within_one_millisecond() {
        let mut log = ConversationLog::new();
        let ids: Vec<i64> = (0..20).map(|_| log.append_user("hi")).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "ids must increase: {:?}", pair);
        }
        assert_eq!(log.len(), 20);
    }

    #[test]
    fn append_preserves_order_and_find_locates_messages() {
        let mut log = ConversationLog::new();
        let a = log.append_user("first");
        let b = log.append_ai("second", normal(), Some("stated a fact".into()));
        assert_eq!(log.messages()[0].id, a);
        assert_eq!(log.messages()[1].id, b);
        let found = log.find(b).expect("ai message");
        assert_eq!(found.sender, Sender::Ai);
        assert!(found.is_self_flagged());
        assert!(log.find(b + 1).is_none());
    }

    #[test]
    fn set_annotation_patches_exactly_one_message() {
        let mut log = ConversationLog::new();
        let a = log.append_ai("one", normal(), None);
        let b = log.append_ai("two", normal(), None);

        let change = log
            .set_annotation(a, Annotation::Categorized(LieCategoryId::Denial))
            .expect("known id");
        assert_eq!(change.previous, Annotation::None);
        assert_eq!(change.persona_id.as_deref(), Some("normal"));
        assert_eq!(
            log.find(a).expect("a").annotation.lie_category(),
            Some(LieCategoryId::Denial)
        );
        assert_eq!(log.find(b).expect("b").annotation, Annotation::None);
    }

    #[test]
    fn set_annotation_on_unknown_id_is_a_no_op() {
        let mut log = ConversationLog::new();
        log.append_user("hello");
        assert!(log.set_annotation(42, Annotation::FlaggedTruth).is_none());
        assert_eq!(log.messages()[0].annotation, Annotation::None);
    }

    #[test]
    fn flagging_replaces_a_prior_category() {
        let mut log = ConversationLog::new();
        let id = log.append_ai("lie", normal(), None);
        log.set_annotation(id, Annotation::Categorized(LieCategoryId::Exaggeration));
        let change = log.set_annotation(id, Annotation::FlaggedTruth).expect("known id");
        assert_eq!(
            change.previous,
            Annotation::Categorized(LieCategoryId::Exaggeration)
        );
        let msg = log.find(id).expect("msg");
        assert!(msg.annotation.is_flagged_truth());
        assert_eq!(msg.annotation.lie_category(), None);
    }

    #[test]
    fn inert_messages_carry_no_persona() {
        let mut log = ConversationLog::new();
        let id = log.append_inert("The Oracle's connection is unstable...");
        let msg = log.find(id).expect("msg");
        assert_eq!(msg.sender, Sender::Ai);
        assert!(msg.persona.is_none());
        assert!(msg.truth_reason.is_none());
    }
}
