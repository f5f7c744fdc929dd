use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One workout attempt, as stored in the Sessions tab
///
/// Appended once at session start; the end stamp and the counts are written
/// exactly once at finish. Append-only in the common path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Opaque identifier referenced by set and note rows
    pub id: String,
    pub user_email: String,
    pub plan_day: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub timezone: String,
    pub planned_exercises: u32,
    pub completed_exercises: u32,
    pub total_sets: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
