use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-session per-exercise free-text note, written once at session finish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseNote {
    pub session_id: String,
    pub exercise: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}
