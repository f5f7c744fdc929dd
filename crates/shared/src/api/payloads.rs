use serde::{Deserialize, Serialize};

use crate::{
    api::error::ValidationError,
    metrics::{PersonalRecords, SessionBest},
    model::{
        CatalogEntry, ExerciseSetup, PlanEntry, Rpe, SetEntry, ValidateModel, Weight,
        WorkoutSession,
    },
    progression::ProgressionState,
};

// One canonical schema per endpoint. Unknown fields are rejected rather than
// silently accepted as aliases

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    pub plan_day: String,
    pub timezone: String,
    pub notes: Option<String>,
}

impl ValidateModel for CreateSessionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.plan_day.trim().is_empty() {
            errors.push("plan_day must not be empty".to_string());
        }
        if self.timezone.trim().is_empty() {
            errors.push("timezone must not be empty".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { error_messages: errors })
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session: WorkoutSession,
    pub progression: ProgressionState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveSetRequest {
    pub exercise: String,
    #[serde(default)]
    pub weight: Weight,
    pub reps: u32,
    pub rpe: Option<Rpe>,
    #[serde(default)]
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub rest_taken_secs: Option<u32>,
    pub rest_target_secs: Option<u32>,
    pub notes: Option<String>,
}

impl ValidateModel for SaveSetRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.exercise.trim().is_empty() {
            errors.push("exercise must not be empty".to_string());
        }
        if !self.skipped && self.reps == 0 {
            errors.push("reps must be at least 1 unless the set is skipped".to_string());
        }
        if self.skip_reason.is_some() && !self.skipped {
            errors.push("skip_reason is only valid on a skipped set".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { error_messages: errors })
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSetResponse {
    pub set: SetEntry,
    pub progression: ProgressionState,
}

/// Corrects an already-logged set in place. Absent fields are left
/// unchanged; for `weight`, an explicit JSON `null` corrects the set to
/// bodyweight, which absence cannot express
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSetRequest {
    #[serde(default, with = "weight_patch", skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
    pub reps: Option<u32>,
    pub rpe: Option<Rpe>,
    pub rest_taken_secs: Option<u32>,
    pub notes: Option<String>,
}

impl ValidateModel for UpdateSetRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.weight.is_none()
            && self.reps.is_none()
            && self.rpe.is_none()
            && self.rest_taken_secs.is_none()
            && self.notes.is_none()
        {
            return Err(ValidationError::new("at least one field must be supplied"));
        }
        if self.reps == Some(0) {
            return Err(ValidationError::new("reps must be at least 1"));
        }
        Ok(())
    }
}

/// Outer `Option` is presence of the key, inner value is the weight itself
/// (where `null` already means bodyweight)
mod weight_patch {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::model::Weight;

    pub fn serialize<S: Serializer>(value: &Option<Weight>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(weight) => weight.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Weight>, D::Error> {
        Weight::deserialize(d).map(Some)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExerciseNotePayload {
    pub exercise: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinishSessionRequest {
    pub notes: Option<String>,
    #[serde(default)]
    pub exercise_notes: Vec<ExerciseNotePayload>,
}

impl ValidateModel for FinishSessionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        for (i, n) in self.exercise_notes.iter().enumerate() {
            if n.exercise.trim().is_empty() {
                errors.push(format!("exercise_notes[{i}].exercise must not be empty"));
            }
            if n.note.trim().is_empty() {
                errors.push(format!("exercise_notes[{i}].note must not be empty"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { error_messages: errors })
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupUpsertRequest {
    pub rest_secs: Option<u32>,
    pub requires_weight: Option<bool>,
    pub notes: Option<String>,
}

impl ValidateModel for SetupUpsertRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// One planned exercise joined with its catalog metadata and the user's setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExercise {
    pub plan: PlanEntry,
    pub catalog: Option<CatalogEntry>,
    pub setup: Option<ExerciseSetup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub day: String,
    pub exercises: Vec<PlanExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub exercise: String,
    /// Most recent session's sets for this exercise, ordered by set number
    pub last_session: Vec<SetEntry>,
    pub records: PersonalRecords,
    /// Oldest to newest, bounded window for trend display
    pub recent_sessions: Vec<SessionBest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub authorize_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_set_rejects_zero_reps_when_not_skipped() {
        let req = SaveSetRequest {
            exercise: "bench_press".into(),
            weight: Weight::Kg(60.0),
            reps: 0,
            rpe: None,
            skipped: false,
            skip_reason: None,
            rest_taken_secs: None,
            rest_target_secs: None,
            notes: None,
        };
        assert!(req.validate().is_err());

        let skipped = SaveSetRequest { skipped: true, skip_reason: Some("shoulder".into()), ..req };
        assert!(skipped.validate().is_ok());
    }

    #[test]
    fn save_set_rejects_unknown_fields() {
        // Aliases for rest seconds are not accepted; there is one canonical key
        let body = r#"{"exercise":"squat","reps":5,"restSeconds":90}"#;
        assert!(serde_json::from_str::<SaveSetRequest>(body).is_err());
    }

    #[test]
    fn update_set_distinguishes_absent_weight_from_explicit_null() {
        let unchanged: UpdateSetRequest = serde_json::from_str(r#"{"reps":6}"#).unwrap();
        assert_eq!(unchanged.weight, None);

        // null is a correction to bodyweight, not "leave as is"
        let to_bodyweight: UpdateSetRequest = serde_json::from_str(r#"{"weight":null}"#).unwrap();
        assert_eq!(to_bodyweight.weight, Some(Weight::Bodyweight));
        assert!(to_bodyweight.validate().is_ok());

        let to_kg: UpdateSetRequest = serde_json::from_str(r#"{"weight":62.5}"#).unwrap();
        assert_eq!(to_kg.weight, Some(Weight::Kg(62.5)));
    }

    #[test]
    fn update_set_requires_some_field() {
        assert!(UpdateSetRequest::default().validate().is_err());
        let req = UpdateSetRequest { reps: Some(6), ..Default::default() };
        assert!(req.validate().is_ok());
    }
}
