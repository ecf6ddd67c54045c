// --- File: crates/bookify_scheduling/src/ranking.rs ---
//! Preference-weighted ordering of candidate slots.

use bookify_config::SchedulingConfig;
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

/// Hours of the day customers pick most often: mid-morning, early/mid
/// afternoon, late afternoon.
pub const DEFAULT_PREFERRED_HOURS: &[u32] = &[10, 13, 14, 16, 17];

const DEFAULT_MAX_RESULTS: usize = 5;

/// A ranked candidate: machine-readable start plus the natural-language
/// rendering shown to end users and voice agents.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RankedSlot {
    /// Start time in the business's local calendar, ISO 8601.
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-02-17T10:00:00"))]
    pub start: NaiveDateTime,
    #[cfg_attr(feature = "openapi", schema(example = "Monday, February 17 at 10:00 AM"))]
    pub display: String,
}

/// Orders slots by preference tier, then chronologically. Preferred hours
/// sort ahead of everything else; within a tier earlier wins, which also
/// breaks cross-date ties by earliest date.
#[derive(Debug, Clone)]
pub struct RecommendationRanker {
    preferred_hours: Vec<u32>,
    max_results: usize,
}

impl RecommendationRanker {
    pub fn new(preferred_hours: Vec<u32>, max_results: usize) -> Self {
        RecommendationRanker {
            preferred_hours,
            max_results,
        }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(
            config
                .preferred_hours
                .clone()
                .unwrap_or_else(|| DEFAULT_PREFERRED_HOURS.to_vec()),
            config.max_alternatives.unwrap_or(DEFAULT_MAX_RESULTS),
        )
    }

    fn tier(&self, slot: NaiveDateTime) -> u8 {
        if self.preferred_hours.contains(&slot.hour()) {
            0
        } else {
            1
        }
    }

    /// Full preference ordering of the candidate pool.
    pub fn rank(&self, mut candidates: Vec<NaiveDateTime>) -> Vec<RankedSlot> {
        candidates.sort();
        candidates.dedup();
        candidates.sort_by_key(|slot| (self.tier(*slot), *slot));
        candidates
            .into_iter()
            .map(|start| RankedSlot {
                start,
                display: format_slot(start),
            })
            .collect()
    }

    /// Bounded alternative list for conflict responses.
    pub fn top(&self, candidates: Vec<NaiveDateTime>) -> Vec<RankedSlot> {
        let mut ranked = self.rank(candidates);
        ranked.truncate(self.max_results);
        ranked
    }
}

/// Presentation helper, kept apart from the ranking itself.
pub fn format_slot(start: NaiveDateTime) -> String {
    format!(
        "{} at {}",
        start.format("%A, %B %-d"),
        start.format("%-I:%M %p")
    )
}
