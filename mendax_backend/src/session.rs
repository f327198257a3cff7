use crate::catalog::{LieCategoryId, OraclePersona};
use crate::export::ExportSnapshot;
use crate::log::ConversationLog;
use crate::message::{Annotation, ChatMessage};
use crate::oracle::OracleReply;
use crate::store::{StateStore, SLOT_ALL_TIME_TRACKING, SLOT_CHAT_MESSAGES};
use crate::tracking::{Tracker, TrackingData, TrackingEvent};

/// The application state behind the UI: conversation log, both tracking
/// scopes, and the persistence store. Every mutating operation settles the
/// counters for both scopes and writes the two slots back, so the on-disk
/// state always reflects the last completed operation.
///
/// Annotation operations on an unknown message id are silent no-ops on both
/// the log and the counters.
pub struct OracleSession {
    log: ConversationLog,
    tracker: Tracker,
    store: StateStore,
}

impl OracleSession {
    /// Restore from the persistence store: the message log and the all-time
    /// scope come from their slots (defaults when absent or malformed), the
    /// session scope always starts from zero.
    pub fn load(store: StateStore) -> Self {
        let log: ConversationLog = store.load(SLOT_CHAT_MESSAGES, ConversationLog::new());
        let all_time: TrackingData = store.load(SLOT_ALL_TIME_TRACKING, TrackingData::default());
        tracing::info!(
            "Restored {} messages, all-time total {}",
            log.len(),
            all_time.total_messages
        );
        Self {
            log,
            tracker: Tracker::with_all_time(all_time),
            store,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.log.messages()
    }

    pub fn session_stats(&self) -> &TrackingData {
        self.tracker.session()
    }

    pub fn all_time_stats(&self) -> &TrackingData {
        self.tracker.all_time()
    }

    /// Append the user's prompt. Blank prompts are rejected.
    pub fn record_user_message(&mut self, text: &str) -> Option<i64> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.log.append_user(text);
        self.tracker.record(&TrackingEvent::AppendUser);
        self.persist();
        Some(id)
    }

    /// Append a successful oracle reply, crediting the persona that was
    /// active when the request went out.
    pub fn record_oracle_reply(&mut self, reply: OracleReply, persona: OraclePersona) -> i64 {
        let self_flagged = reply.truth_reason.is_some();
        let persona_id = persona.id.clone();
        let id = self.log.append_ai(reply.text, persona, reply.truth_reason);
        self.tracker.record(&TrackingEvent::AppendAi {
            persona_id,
            self_flagged,
        });
        self.persist();
        id
    }

    /// Append the inert fallback message after a failed oracle request. It
    /// carries no persona and moves no counters.
    pub fn record_fallback(&mut self, text: &str) -> i64 {
        let id = self.log.append_inert(text);
        self.persist();
        id
    }

    /// Mark a message as actually truthful. Clears any lie category on the
    /// message; the category's counter keeps its contribution (see the
    /// asymmetry note on `TrackingEvent`).
    pub fn flag_truth(&mut self, id: i64) {
        let Some(change) = self.log.set_annotation(id, Annotation::FlaggedTruth) else {
            return;
        };
        if let Some(persona_id) = change.persona_id {
            self.tracker.record(&TrackingEvent::FlagTruth { persona_id });
        }
        self.persist();
    }

    /// Withdraw a manual truth flag. The decrement floors at zero, so stray
    /// unflags never drive the counters negative.
    pub fn unflag_truth(&mut self, id: i64) {
        let Some(msg) = self.log.find(id) else {
            return;
        };
        let persona_id = msg.persona_id().map(str::to_string);
        if msg.annotation.is_flagged_truth() {
            self.log.set_annotation(id, Annotation::None);
        }
        if let Some(persona_id) = persona_id {
            self.tracker.record(&TrackingEvent::UnflagTruth { persona_id });
        }
        self.persist();
    }

    /// Classify a message as a particular kind of lie. Clears any manual
    /// truth flag on the message without touching the manual-flag counters.
    pub fn categorize(&mut self, id: i64, category: LieCategoryId) {
        if self
            .log
            .set_annotation(id, Annotation::Categorized(category))
            .is_none()
        {
            return;
        }
        self.tracker.record(&TrackingEvent::Categorize(category));
        self.persist();
    }

    /// Withdraw a lie classification; the decrement floors at zero.
    pub fn uncategorize(&mut self, id: i64, category: LieCategoryId) {
        let Some(msg) = self.log.find(id) else {
            return;
        };
        if msg.annotation.lie_category().is_some() {
            self.log.set_annotation(id, Annotation::None);
        }
        self.tracker.record(&TrackingEvent::Uncategorize(category));
        self.persist();
    }

    /// Empty the conversation and zero the session scope. The all-time scope
    /// stands.
    pub fn reset_session(&mut self) {
        self.log.clear();
        self.tracker.reset_session();
        self.persist();
    }

    /// Empty the conversation and zero both scopes, on disk included: both
    /// slots are deleted, so a reload starts from the zero shape.
    pub fn clear_all(&mut self) {
        self.log.clear();
        self.tracker.clear_all();
        self.store.clear(SLOT_CHAT_MESSAGES);
        self.store.clear(SLOT_ALL_TIME_TRACKING);
    }

    pub fn export_snapshot(&self) -> ExportSnapshot {
        ExportSnapshot::new(
            self.log.messages().to_vec(),
            self.tracker.session().clone(),
            self.tracker.all_time().clone(),
        )
    }

    fn persist(&self) {
        self.store.save(SLOT_CHAT_MESSAGES, &self.log);
        self.store.save(SLOT_ALL_TIME_TRACKING, self.tracker.all_time());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::persona_by_id;

    fn session() -> OracleSession {
        OracleSession::load(StateStore::in_memory().expect("store"))
    }

    fn reply(text: &str, truth_reason: Option<&str>) -> OracleReply {
        OracleReply {
            text: text.to_string(),
            truth_reason: truth_reason.map(str::to_string),
        }
    }

    fn normal() -> OraclePersona {
        persona_by_id("normal").expect("builtin persona")
    }

    #[test]
    fn one_turn_updates_both_scopes_identically() {
        let mut s = session();
        s.record_user_message("What is 1+1?").expect("user id");
        assert_eq!(s.session_stats().total_messages, 1);

        s.record_oracle_reply(reply("It is a window.", Some("stated a fact")), normal());
        for stats in [s.session_stats(), s.all_time_stats()] {
            assert_eq!(stats.total_messages, 2);
            assert_eq!(stats.total_ai_messages, 1);
            assert_eq!(stats.total_self_flagged_truths, 1);
            let normal = stats.persona("normal");
            assert_eq!(normal.total_ai_messages, 1);
            assert_eq!(normal.total_self_flagged_truths, 1);
            assert_eq!(normal.total_manually_flagged_truths, 0);
        }
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let mut s = session();
        assert!(s.record_user_message("   ").is_none());
        assert!(s.messages().is_empty());
        assert_eq!(s.session_stats().total_messages, 0);
    }

    #[test]
    fn fallback_message_moves_no_counters() {
        let mut s = session();
        let id = s.record_fallback("The Oracle's connection is unstable...");
        assert_eq!(s.messages().len(), 1);
        assert!(s.messages()[0].persona.is_none());
        assert_eq!(s.session_stats().total_messages, 0);
        // And it cannot contribute manual-flag counts later.
        s.flag_truth(id);
        assert_eq!(s.session_stats().total_manually_flagged_truths, 0);
        assert!(s.messages()[0].annotation.is_flagged_truth());
    }

    #[test]
    fn flag_then_categorize_keeps_the_manual_count() {
        let mut s = session();
        let id = s.record_oracle_reply(reply("A lie.", None), normal());

        s.flag_truth(id);
        assert_eq!(s.session_stats().total_manually_flagged_truths, 1);
        assert_eq!(s.session_stats().persona("normal").total_manually_flagged_truths, 1);
        assert_eq!(s.messages()[0].annotation.lie_category(), None);

        s.categorize(id, LieCategoryId::Fabrication);
        assert_eq!(s.session_stats().category_count(LieCategoryId::Fabrication), 1);
        assert!(!s.messages()[0].annotation.is_flagged_truth());
        // The known asymmetry: the manual-flag count does not roll back.
        assert_eq!(s.session_stats().total_manually_flagged_truths, 1);
    }

    #[test]
    fn flag_unflag_round_trips_and_floors() {
        let mut s = session();
        let id = s.record_oracle_reply(reply("A lie.", None), normal());
        let before = s.session_stats().clone();

        s.flag_truth(id);
        s.unflag_truth(id);
        assert_eq!(*s.session_stats(), before);

        s.unflag_truth(id);
        s.unflag_truth(id);
        assert_eq!(s.session_stats().total_manually_flagged_truths, 0);
        assert_eq!(s.session_stats().persona("normal").total_manually_flagged_truths, 0);
    }

    #[test]
    fn annotation_operations_on_unknown_ids_are_no_ops() {
        let mut s = session();
        s.record_oracle_reply(reply("A lie.", None), normal());
        let before = s.session_stats().clone();
        s.flag_truth(999);
        s.unflag_truth(999);
        s.categorize(999, LieCategoryId::Denial);
        s.uncategorize(999, LieCategoryId::Denial);
        assert_eq!(*s.session_stats(), before);
        assert_eq!(s.messages()[0].annotation, Annotation::None);
    }

    #[test]
    fn reset_session_keeps_all_time_counters() {
        let mut s = session();
        s.record_user_message("hi");
        s.record_oracle_reply(reply("A lie.", None), normal());
        s.reset_session();
        assert!(s.messages().is_empty());
        assert_eq!(*s.session_stats(), TrackingData::default());
        assert_eq!(s.all_time_stats().total_messages, 2);
    }

    #[test]
    fn clear_all_zeroes_everything() {
        let mut s = session();
        s.record_user_message("hi");
        let id = s.record_oracle_reply(reply("A lie.", Some("oops")), normal());
        s.categorize(id, LieCategoryId::Denial);
        s.clear_all();
        assert!(s.messages().is_empty());
        assert_eq!(*s.session_stats(), TrackingData::default());
        assert_eq!(*s.all_time_stats(), TrackingData::default());
    }

    #[test]
    fn clear_all_deletes_the_persisted_slots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.db");
        {
            let mut s = OracleSession::load(StateStore::open(&path).expect("open"));
            s.record_user_message("hi");
            s.record_oracle_reply(reply("A lie.", Some("oops")), normal());
            s.clear_all();
        }
        let s = OracleSession::load(StateStore::open(&path).expect("reopen"));
        assert!(s.messages().is_empty());
        assert_eq!(*s.all_time_stats(), TrackingData::default());
        assert_eq!(*s.session_stats(), TrackingData::default());
    }

    #[test]
    fn state_survives_a_reload_with_session_scope_rezeroed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.db");
        {
            let mut s = OracleSession::load(StateStore::open(&path).expect("open"));
            s.record_user_message("hi");
            s.record_oracle_reply(reply("A lie.", Some("oops")), normal());
        }
        let s = OracleSession::load(StateStore::open(&path).expect("reopen"));
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.all_time_stats().total_messages, 2);
        assert_eq!(s.all_time_stats().total_self_flagged_truths, 1);
        assert_eq!(*s.session_stats(), TrackingData::default());
    }

    #[test]
    fn export_snapshot_reflects_current_state() {
        let mut s = session();
        s.record_user_message("hi");
        let snapshot = s.export_snapshot();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.session_tracking_data.total_messages, 1);
        assert_eq!(snapshot.all_time_tracking_data.total_messages, 1);
    }
}
