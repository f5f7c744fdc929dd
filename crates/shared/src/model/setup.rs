use serde::{Deserialize, Serialize};

/// User-specific defaults for one exercise, as stored in the Setup tab
///
/// Upserted keyed by (user email, exercise)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSetup {
    pub user_email: String,
    pub exercise: String,
    pub rest_secs: Option<u32>,
    pub requires_weight: Option<bool>,
    pub notes: Option<String>,
}
