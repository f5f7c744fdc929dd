//! History aggregation: last-session values, personal records and the
//! bounded recent-session window for trend display.
//!
//! Everything is a single linear pass over history fetched fresh per
//! request. Row counts are personal-scale, so no incremental computation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::SetEntry;

/// Upper bound on the trend window regardless of what the caller asks for
pub const RECENT_SESSION_WINDOW: usize = 12;

/// Which sets count towards records
///
/// The defaults exclude skipped sets and (when one is named) the
/// currently-open session; call sites pass the policy explicitly rather
/// than each picking its own convention
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrPolicy {
    pub include_skipped: bool,
    /// Session id of an unfinished session to exclude, if any
    pub open_session: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecords {
    pub max_weight_kg: Option<f64>,
    pub max_weight_times_reps: Option<f64>,
}

/// Per-session best values for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBest {
    pub session_id: String,
    pub last_set_at: DateTime<Utc>,
    pub best_weight_kg: f64,
    pub best_weight_times_reps: f64,
    pub sets: u32,
}

fn eligible<'a>(
    history: &'a [SetEntry],
    exercise: &'a str,
    policy: &'a PrPolicy,
) -> impl Iterator<Item = &'a SetEntry> {
    history.iter().filter(move |s| {
        s.exercise == exercise
            && !s.deleted
            && (policy.include_skipped || !s.skipped)
            && policy.open_session.as_deref() != Some(s.session_id.as_str())
    })
}

/// Weight*reps with zero/absent weight multiplying as 1, so bodyweight
/// movements don't collapse the product to zero
fn product(set: &SetEntry) -> f64 {
    set.weight.product_multiplier() * set.reps as f64
}

pub fn personal_records(history: &[SetEntry], exercise: &str, policy: &PrPolicy) -> PersonalRecords {
    let mut max_weight_kg: Option<f64> = None;
    let mut max_product: Option<f64> = None;
    for set in eligible(history, exercise, policy) {
        max_weight_kg = Some(max_weight_kg.unwrap_or(f64::MIN).max(set.weight.as_kg()));
        max_product = Some(max_product.unwrap_or(f64::MIN).max(product(set)));
    }
    PersonalRecords { max_weight_kg, max_weight_times_reps: max_product }
}

/// The most recent session's sets for an exercise, ordered by set number.
/// Skipped sets are part of the session record and stay in; deleted ones
/// don't
pub fn last_session_sets(history: &[SetEntry], exercise: &str) -> Vec<SetEntry> {
    let policy = PrPolicy { include_skipped: true, open_session: None };
    let last_session = eligible(history, exercise, &policy)
        .max_by_key(|s| s.created_at)
        .map(|s| s.session_id.clone());

    let Some(session_id) = last_session else {
        return Vec::new();
    };

    let mut sets: Vec<SetEntry> = eligible(history, exercise, &policy)
        .filter(|s| s.session_id == session_id)
        .cloned()
        .collect();
    sets.sort_by_key(|s| s.set_number);
    sets
}

/// Per-session bests over the most recent sessions, oldest to newest for
/// charting. Reverse the result for list display
pub fn recent_sessions(
    history: &[SetEntry],
    exercise: &str,
    limit: usize,
    policy: &PrPolicy,
) -> Vec<SessionBest> {
    let mut by_session: HashMap<&str, SessionBest> = HashMap::new();
    for set in eligible(history, exercise, policy) {
        let entry = by_session.entry(set.session_id.as_str()).or_insert_with(|| SessionBest {
            session_id: set.session_id.clone(),
            last_set_at: set.created_at,
            best_weight_kg: 0.0,
            best_weight_times_reps: 0.0,
            sets: 0,
        });
        entry.last_set_at = entry.last_set_at.max(set.created_at);
        entry.best_weight_kg = entry.best_weight_kg.max(set.weight.as_kg());
        entry.best_weight_times_reps = entry.best_weight_times_reps.max(product(set));
        entry.sets += 1;
    }

    let mut sessions: Vec<SessionBest> = by_session.into_values().collect();
    sessions.sort_by_key(|s| s.last_set_at);

    let keep = limit.min(RECENT_SESSION_WINDOW);
    if sessions.len() > keep {
        sessions.drain(..sessions.len() - keep);
    }
    sessions
}
