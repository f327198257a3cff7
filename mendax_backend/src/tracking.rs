use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{self, LieCategoryId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaStats {
    pub total_ai_messages: u64,
    pub total_self_flagged_truths: u64,
    pub total_manually_flagged_truths: u64,
}

/// Running deception counters for one scope (session or all-time).
///
/// Consistency contract, preserved by every `apply`: each of the three
/// AI-message counters equals the sum of the corresponding per-persona
/// counters, and no counter ever goes negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingData {
    pub total_messages: u64,
    pub total_ai_messages: u64,
    pub total_self_flagged_truths: u64,
    pub total_manually_flagged_truths: u64,
    pub lie_category_counts: BTreeMap<LieCategoryId, u64>,
    pub persona_stats: BTreeMap<String, PersonaStats>,
}

impl Default for TrackingData {
    fn default() -> Self {
        // Pre-seed every category and every built-in persona with zeros so
        // the dashboard always has a full shape to render.
        let lie_category_counts = LieCategoryId::ALL.iter().map(|&id| (id, 0)).collect();
        let persona_stats = catalog::personas()
            .into_iter()
            .map(|p| (p.id, PersonaStats::default()))
            .collect();
        Self {
            total_messages: 0,
            total_ai_messages: 0,
            total_self_flagged_truths: 0,
            total_manually_flagged_truths: 0,
            lie_category_counts,
            persona_stats,
        }
    }
}

/// The closed set of events the aggregation engine understands. Both scopes
/// consume the identical stream; they differ only in reset lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingEvent {
    AppendUser,
    AppendAi {
        persona_id: String,
        self_flagged: bool,
    },
    FlagTruth {
        persona_id: String,
    },
    UnflagTruth {
        persona_id: String,
    },
    Categorize(LieCategoryId),
    Uncategorize(LieCategoryId),
}

impl TrackingData {
    pub fn apply(&mut self, event: &TrackingEvent) {
        match event {
            TrackingEvent::AppendUser => {
                self.total_messages += 1;
            }
            TrackingEvent::AppendAi {
                persona_id,
                self_flagged,
            } => {
                self.total_messages += 1;
                self.total_ai_messages += 1;
                if *self_flagged {
                    self.total_self_flagged_truths += 1;
                }
                let stats = self.persona_stats.entry(persona_id.clone()).or_default();
                stats.total_ai_messages += 1;
                if *self_flagged {
                    stats.total_self_flagged_truths += 1;
                }
            }
            TrackingEvent::FlagTruth { persona_id } => {
                self.total_manually_flagged_truths += 1;
                self.persona_stats
                    .entry(persona_id.clone())
                    .or_default()
                    .total_manually_flagged_truths += 1;
            }
            TrackingEvent::UnflagTruth { persona_id } => {
                // Floored so stray unflags can never drive a counter
                // negative, even against an already inconsistent snapshot.
                self.total_manually_flagged_truths =
                    self.total_manually_flagged_truths.saturating_sub(1);
                if let Some(stats) = self.persona_stats.get_mut(persona_id) {
                    stats.total_manually_flagged_truths =
                        stats.total_manually_flagged_truths.saturating_sub(1);
                }
            }
            TrackingEvent::Categorize(category) => {
                *self.lie_category_counts.entry(*category).or_insert(0) += 1;
            }
            TrackingEvent::Uncategorize(category) => {
                let count = self.lie_category_counts.entry(*category).or_insert(0);
                *count = count.saturating_sub(1);
            }
        }
    }

    pub fn category_count(&self, category: LieCategoryId) -> u64 {
        self.lie_category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn persona(&self, persona_id: &str) -> PersonaStats {
        self.persona_stats.get(persona_id).copied().unwrap_or_default()
    }
}

/// Both counter scopes behind one apply path. Every recorded event hits the
/// session scope and the all-time scope with the same delta; only the reset
/// lifecycles differ.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    session: TrackingData,
    all_time: TrackingData,
}

impl Tracker {
    pub fn with_all_time(all_time: TrackingData) -> Self {
        Self {
            session: TrackingData::default(),
            all_time,
        }
    }

    pub fn session(&self) -> &TrackingData {
        &self.session
    }

    pub fn all_time(&self) -> &TrackingData {
        &self.all_time
    }

    pub fn record(&mut self, event: &TrackingEvent) {
        self.session.apply(event);
        self.all_time.apply(event);
    }

    /// Session reset: session counters return to zero, all-time stands.
    pub fn reset_session(&mut self) {
        self.session = TrackingData::default();
    }

    /// "Clear All Data": both scopes return to the zero shape.
    pub fn clear_all(&mut self) {
        self.session = TrackingData::default();
        self.all_time = TrackingData::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_persona_sums_hold(data: &TrackingData) {
        let ai: u64 = data.persona_stats.values().map(|s| s.total_ai_messages).sum();
        let self_flagged: u64 = data
            .persona_stats
            .values()
            .map(|s| s.total_self_flagged_truths)
            .sum();
        let manual: u64 = data
            .persona_stats
            .values()
            .map(|s| s.total_manually_flagged_truths)
            .sum();
        assert_eq!(data.total_ai_messages, ai);
        assert_eq!(data.total_self_flagged_truths, self_flagged);
        assert_eq!(data.total_manually_flagged_truths, manual);
    }

    fn ai(persona_id: &str, self_flagged: bool) -> TrackingEvent {
        TrackingEvent::AppendAi {
            persona_id: persona_id.to_string(),
            self_flagged,
        }
    }

    #[test]
    fn default_shape_is_fully_seeded_with_zeros() {
        let data = TrackingData::default();
        assert_eq!(data.lie_category_counts.len(), 5);
        assert!(data.lie_category_counts.values().all(|&c| c == 0));
        assert_eq!(data.persona_stats.len(), catalog::personas().len());
        assert!(data.persona_stats.values().all(|s| *s == PersonaStats::default()));
    }

    #[test]
    fn user_then_ai_append_scenario() {
        let mut data = TrackingData::default();
        data.apply(&TrackingEvent::AppendUser);
        assert_eq!(data.total_messages, 1);

        data.apply(&ai("normal", true));
        assert_eq!(data.total_messages, 2);
        assert_eq!(data.total_ai_messages, 1);
        assert_eq!(data.total_self_flagged_truths, 1);
        let normal = data.persona("normal");
        assert_eq!(normal.total_ai_messages, 1);
        assert_eq!(normal.total_self_flagged_truths, 1);
        assert_eq!(normal.total_manually_flagged_truths, 0);
        assert_persona_sums_hold(&data);
    }

    #[test]
    fn unknown_persona_gets_a_zeroed_entry_on_demand() {
        let mut data = TrackingData::default();
        data.apply(&ai("brand_new", false));
        assert_eq!(data.persona("brand_new").total_ai_messages, 1);
        assert_persona_sums_hold(&data);
    }

    #[test]
    fn flag_unflag_is_an_exact_inverse() {
        let mut data = TrackingData::default();
        data.apply(&ai("normal", false));
        let before = data.clone();

        data.apply(&TrackingEvent::FlagTruth {
            persona_id: "normal".into(),
        });
        assert_eq!(data.total_manually_flagged_truths, 1);
        assert_eq!(data.persona("normal").total_manually_flagged_truths, 1);

        data.apply(&TrackingEvent::UnflagTruth {
            persona_id: "normal".into(),
        });
        assert_eq!(data, before);
    }

    #[test]
    fn stray_unflags_floor_at_zero() {
        let mut data = TrackingData::default();
        for _ in 0..3 {
            data.apply(&TrackingEvent::UnflagTruth {
                persona_id: "normal".into(),
            });
        }
        assert_eq!(data.total_manually_flagged_truths, 0);
        assert_eq!(data.persona("normal").total_manually_flagged_truths, 0);
        assert_persona_sums_hold(&data);
    }

    #[test]
    fn categorize_uncategorize_is_an_exact_inverse_and_floors() {
        let mut data = TrackingData::default();
        data.apply(&TrackingEvent::Categorize(LieCategoryId::Misdirection));
        assert_eq!(data.category_count(LieCategoryId::Misdirection), 1);
        data.apply(&TrackingEvent::Uncategorize(LieCategoryId::Misdirection));
        assert_eq!(data.category_count(LieCategoryId::Misdirection), 0);
        // Extra uncategorize must not underflow.
        data.apply(&TrackingEvent::Uncategorize(LieCategoryId::Misdirection));
        assert_eq!(data.category_count(LieCategoryId::Misdirection), 0);
    }

    #[test]
    fn self_flag_count_is_never_decremented() {
        let mut data = TrackingData::default();
        data.apply(&ai("normal", true));
        // Manual corrections operate on the manual counter only.
        data.apply(&TrackingEvent::FlagTruth {
            persona_id: "normal".into(),
        });
        data.apply(&TrackingEvent::UnflagTruth {
            persona_id: "normal".into(),
        });
        data.apply(&TrackingEvent::Categorize(LieCategoryId::Denial));
        data.apply(&TrackingEvent::Uncategorize(LieCategoryId::Denial));
        assert_eq!(data.total_self_flagged_truths, 1);
        assert_eq!(data.persona("normal").total_self_flagged_truths, 1);
    }

    #[test]
    fn categorize_after_flag_leaves_manual_count() {
        // The documented asymmetry: replacing a truth flag with a lie
        // category does not roll the manual-flag counter back.
        let mut data = TrackingData::default();
        data.apply(&ai("normal", false));
        data.apply(&TrackingEvent::FlagTruth {
            persona_id: "normal".into(),
        });
        data.apply(&TrackingEvent::Categorize(LieCategoryId::Fabrication));
        assert_eq!(data.total_manually_flagged_truths, 1);
        assert_eq!(data.category_count(LieCategoryId::Fabrication), 1);
        assert_persona_sums_hold(&data);
    }

    #[test]
    fn persona_sums_hold_after_arbitrary_event_sequences() {
        let mut data = TrackingData::default();
        let events = [
            TrackingEvent::AppendUser,
            ai("normal", true),
            ai("jaded_dragon", false),
            TrackingEvent::FlagTruth {
                persona_id: "jaded_dragon".into(),
            },
            TrackingEvent::Categorize(LieCategoryId::Exaggeration),
            TrackingEvent::UnflagTruth {
                persona_id: "jaded_dragon".into(),
            },
            TrackingEvent::UnflagTruth {
                persona_id: "jaded_dragon".into(),
            },
            ai("conspiracy_goblin", true),
            TrackingEvent::Uncategorize(LieCategoryId::Exaggeration),
            TrackingEvent::Uncategorize(LieCategoryId::Denial),
            TrackingEvent::FlagTruth {
                persona_id: "normal".into(),
            },
        ];
        for event in &events {
            data.apply(event);
            assert_persona_sums_hold(&data);
        }
        assert_eq!(data.total_messages, 4);
        assert_eq!(data.total_ai_messages, 3);
        assert_eq!(data.total_self_flagged_truths, 2);
        assert_eq!(data.total_manually_flagged_truths, 1);
    }

    #[test]
    fn tracker_applies_the_same_delta_to_both_scopes() {
        let mut tracker = Tracker::default();
        tracker.record(&TrackingEvent::AppendUser);
        tracker.record(&ai("normal", true));
        assert_eq!(tracker.session(), tracker.all_time());

        tracker.reset_session();
        assert_eq!(*tracker.session(), TrackingData::default());
        assert_eq!(tracker.all_time().total_messages, 2);

        tracker.record(&ai("normal", false));
        assert_eq!(tracker.session().total_ai_messages, 1);
        assert_eq!(tracker.all_time().total_ai_messages, 2);

        tracker.clear_all();
        assert_eq!(*tracker.session(), TrackingData::default());
        assert_eq!(*tracker.all_time(), TrackingData::default());
    }

    #[test]
    fn tracker_resumes_from_a_persisted_all_time_scope() {
        let mut seeded = TrackingData::default();
        seeded.apply(&ai("normal", false));
        let tracker = Tracker::with_all_time(seeded.clone());
        assert_eq!(*tracker.all_time(), seeded);
        assert_eq!(*tracker.session(), TrackingData::default());
    }
}
