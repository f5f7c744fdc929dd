//! Per-tab field layouts and the row mapping for each model type.
//!
//! Header variants cover the spellings that have been seen in real sheets;
//! the fallback column is the canonical tab layout documented in the
//! README of the sheet itself.

use chrono::Utc;
use shared::model::{
    CatalogEntry, ExerciseNote, ExerciseSetup, PlanEntry, RepRange, SetEntry, WorkoutSession,
};
use uuid::Uuid;

use super::codec::{format_number, CodecError, FieldSpec, HeaderIndex, RowReader, RowWriter};

pub trait SheetSchema: Sized {
    const FIELDS: &'static [FieldSpec];

    fn from_row(reader: &RowReader) -> Result<Self, CodecError>;
    fn write(&self, writer: &mut RowWriter);

    fn decode(index: &HeaderIndex, row: &[String]) -> Result<Self, CodecError> {
        Self::from_row(&RowReader::new(index, row))
    }

    fn encode(&self, index: &HeaderIndex) -> Vec<String> {
        let mut writer = RowWriter::new(index);
        self.write(&mut writer);
        writer.into_row()
    }
}

impl SheetSchema for SetEntry {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "id", variants: &["SetId", "set_id", "Set ID"], fallback: 0 },
        FieldSpec { name: "session_id", variants: &["SessionId", "session_id", "Session"], fallback: 1 },
        FieldSpec { name: "exercise", variants: &["Exercise", "ExerciseKey", "exercise_key"], fallback: 2 },
        FieldSpec { name: "set_number", variants: &["SetNumber", "set_number", "Set #"], fallback: 3 },
        FieldSpec { name: "weight", variants: &["Weight", "WeightKg", "weight_kg"], fallback: 4 },
        FieldSpec { name: "reps", variants: &["Reps"], fallback: 5 },
        FieldSpec { name: "rpe", variants: &["RPE", "rpe"], fallback: 6 },
        FieldSpec { name: "skipped", variants: &["Skipped", "Skip"], fallback: 7 },
        FieldSpec { name: "skip_reason", variants: &["SkipReason", "skip_reason"], fallback: 8 },
        FieldSpec { name: "rest_taken_secs", variants: &["RestTakenSecs", "rest_taken_secs", "RestTaken"], fallback: 9 },
        FieldSpec { name: "rest_target_secs", variants: &["RestTargetSecs", "rest_target_secs", "RestTarget"], fallback: 10 },
        FieldSpec { name: "notes", variants: &["Notes"], fallback: 11 },
        FieldSpec { name: "deleted", variants: &["Deleted"], fallback: 12 },
        FieldSpec { name: "created_at", variants: &["CreatedAt", "created_at", "Timestamp"], fallback: 13 },
    ];

    fn from_row(reader: &RowReader) -> Result<Self, CodecError> {
        let raw_id = reader.require("id")?;
        let id = raw_id.parse::<Uuid>().map_err(|_| CodecError::Unparseable {
            field: "id",
            value: raw_id.to_string(),
        })?;

        Ok(SetEntry {
            id,
            session_id: reader.require("session_id")?.to_string(),
            exercise: reader.get_string("exercise").unwrap_or_default(),
            set_number: reader.get_u32("set_number").unwrap_or(0),
            weight: reader.get_weight("weight"),
            reps: reader.get_u32("reps").unwrap_or(0),
            rpe: reader.get_rpe("rpe"),
            skipped: reader.get_bool("skipped"),
            skip_reason: reader.get_string("skip_reason"),
            rest_taken_secs: reader.get_u32("rest_taken_secs"),
            rest_target_secs: reader.get_u32("rest_target_secs"),
            notes: reader.get_string("notes"),
            deleted: reader.get_bool("deleted"),
            created_at: reader.get_datetime("created_at").unwrap_or_else(Utc::now),
        })
    }

    fn write(&self, writer: &mut RowWriter) {
        writer.set("id", self.id.to_string());
        writer.set("session_id", self.session_id.clone());
        writer.set("exercise", self.exercise.clone());
        writer.set("set_number", self.set_number.to_string());
        writer.set_weight("weight", self.weight);
        writer.set("reps", self.reps.to_string());
        writer.set_opt("rpe", &self.rpe.map(|r| format_number(r.as_f64())));
        writer.set_bool("skipped", self.skipped);
        writer.set_opt("skip_reason", &self.skip_reason);
        writer.set_opt("rest_taken_secs", &self.rest_taken_secs);
        writer.set_opt("rest_target_secs", &self.rest_target_secs);
        writer.set_opt("notes", &self.notes);
        writer.set_bool("deleted", self.deleted);
        writer.set("created_at", self.created_at.to_rfc3339());
    }
}

impl SheetSchema for WorkoutSession {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "id", variants: &["SessionId", "session_id", "Session ID"], fallback: 0 },
        FieldSpec { name: "user_email", variants: &["UserEmail", "user_email", "Email"], fallback: 1 },
        FieldSpec { name: "plan_day", variants: &["PlanDay", "plan_day", "Day"], fallback: 2 },
        FieldSpec { name: "started_at", variants: &["StartedAt", "started_at", "Start"], fallback: 3 },
        FieldSpec { name: "ended_at", variants: &["EndedAt", "ended_at", "End"], fallback: 4 },
        FieldSpec { name: "timezone", variants: &["Timezone", "TimeZone"], fallback: 5 },
        FieldSpec { name: "planned_exercises", variants: &["PlannedExercises", "planned_exercises"], fallback: 6 },
        FieldSpec { name: "completed_exercises", variants: &["CompletedExercises", "completed_exercises"], fallback: 7 },
        FieldSpec { name: "total_sets", variants: &["TotalSets", "total_sets"], fallback: 8 },
        FieldSpec { name: "notes", variants: &["Notes"], fallback: 9 },
        FieldSpec { name: "created_at", variants: &["CreatedAt", "created_at"], fallback: 10 },
    ];

    fn from_row(reader: &RowReader) -> Result<Self, CodecError> {
        Ok(WorkoutSession {
            id: reader.require("id")?.to_string(),
            user_email: reader.get_string("user_email").unwrap_or_default(),
            plan_day: reader.get_string("plan_day").unwrap_or_default(),
            started_at: reader.get_datetime("started_at").unwrap_or_else(Utc::now),
            ended_at: reader.get_datetime("ended_at"),
            timezone: reader.get_string("timezone").unwrap_or_default(),
            planned_exercises: reader.get_u32("planned_exercises").unwrap_or(0),
            completed_exercises: reader.get_u32("completed_exercises").unwrap_or(0),
            total_sets: reader.get_u32("total_sets").unwrap_or(0),
            notes: reader.get_string("notes"),
            created_at: reader.get_datetime("created_at").unwrap_or_else(Utc::now),
        })
    }

    fn write(&self, writer: &mut RowWriter) {
        writer.set("id", self.id.clone());
        writer.set("user_email", self.user_email.clone());
        writer.set("plan_day", self.plan_day.clone());
        writer.set("started_at", self.started_at.to_rfc3339());
        writer.set_opt("ended_at", &self.ended_at.map(|t| t.to_rfc3339()));
        writer.set("timezone", self.timezone.clone());
        writer.set("planned_exercises", self.planned_exercises.to_string());
        writer.set("completed_exercises", self.completed_exercises.to_string());
        writer.set("total_sets", self.total_sets.to_string());
        writer.set_opt("notes", &self.notes);
        writer.set("created_at", self.created_at.to_rfc3339());
    }
}

impl SheetSchema for PlanEntry {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "user_email", variants: &["UserEmail", "user_email", "Email"], fallback: 0 },
        FieldSpec { name: "day", variants: &["Day", "PlanDay", "plan_day"], fallback: 1 },
        FieldSpec { name: "exercise", variants: &["Exercise", "ExerciseKey", "exercise_key"], fallback: 2 },
        FieldSpec { name: "order", variants: &["Order", "Sort", "Position"], fallback: 3 },
        FieldSpec { name: "planned_sets", variants: &["PlannedSets", "planned_sets", "Sets"], fallback: 4 },
        FieldSpec { name: "rep_range", variants: &["RepRange", "rep_range", "Reps"], fallback: 5 },
        FieldSpec { name: "rest_secs", variants: &["RestSecs", "rest_secs", "Rest"], fallback: 6 },
        FieldSpec { name: "video_url", variants: &["VideoUrl", "video_url", "Video"], fallback: 7 },
    ];

    fn from_row(reader: &RowReader) -> Result<Self, CodecError> {
        Ok(PlanEntry {
            user_email: reader.require("user_email")?.to_string(),
            day: reader.require("day")?.to_string(),
            exercise: reader.require("exercise")?.to_string(),
            order: reader.get_u32("order").unwrap_or(0),
            planned_sets: reader.get_u32("planned_sets").unwrap_or(1).max(1),
            rep_range: reader
                .get("rep_range")
                .and_then(|v| v.parse::<RepRange>().ok())
                .unwrap_or(RepRange { low: 1, high: 1 }),
            rest_secs: reader.get_u32("rest_secs"),
            video_url: reader.get_string("video_url"),
        })
    }

    fn write(&self, writer: &mut RowWriter) {
        writer.set("user_email", self.user_email.clone());
        writer.set("day", self.day.clone());
        writer.set("exercise", self.exercise.clone());
        writer.set("order", self.order.to_string());
        writer.set("planned_sets", self.planned_sets.to_string());
        writer.set("rep_range", self.rep_range.to_string());
        writer.set_opt("rest_secs", &self.rest_secs);
        writer.set_opt("video_url", &self.video_url);
    }
}

impl SheetSchema for CatalogEntry {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "exercise", variants: &["Exercise", "ExerciseKey", "exercise_key", "Key"], fallback: 0 },
        FieldSpec { name: "name", variants: &["Name", "DisplayName"], fallback: 1 },
        FieldSpec { name: "video_url", variants: &["VideoUrl", "video_url", "Video"], fallback: 2 },
        FieldSpec { name: "default_rest_secs", variants: &["DefaultRestSecs", "default_rest_secs", "Rest"], fallback: 3 },
        FieldSpec { name: "requires_weight", variants: &["RequiresWeight", "requires_weight"], fallback: 4 },
        FieldSpec { name: "active", variants: &["Active"], fallback: 5 },
    ];

    fn from_row(reader: &RowReader) -> Result<Self, CodecError> {
        let exercise = reader.require("exercise")?.to_string();
        Ok(CatalogEntry {
            name: reader.get_string("name").unwrap_or_else(|| exercise.clone()),
            exercise,
            video_url: reader.get_string("video_url"),
            default_rest_secs: reader.get_u32("default_rest_secs"),
            requires_weight: reader.get_bool("requires_weight"),
            active: reader.get_bool("active"),
        })
    }

    fn write(&self, writer: &mut RowWriter) {
        writer.set("exercise", self.exercise.clone());
        writer.set("name", self.name.clone());
        writer.set_opt("video_url", &self.video_url);
        writer.set_opt("default_rest_secs", &self.default_rest_secs);
        writer.set_bool("requires_weight", self.requires_weight);
        writer.set_bool("active", self.active);
    }
}

impl SheetSchema for ExerciseSetup {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "user_email", variants: &["UserEmail", "user_email", "Email"], fallback: 0 },
        FieldSpec { name: "exercise", variants: &["Exercise", "ExerciseKey", "exercise_key"], fallback: 1 },
        FieldSpec { name: "rest_secs", variants: &["RestSecs", "rest_secs", "Rest"], fallback: 2 },
        FieldSpec { name: "requires_weight", variants: &["RequiresWeight", "requires_weight"], fallback: 3 },
        FieldSpec { name: "notes", variants: &["Notes", "SetupNotes"], fallback: 4 },
    ];

    fn from_row(reader: &RowReader) -> Result<Self, CodecError> {
        Ok(ExerciseSetup {
            user_email: reader.require("user_email")?.to_string(),
            exercise: reader.require("exercise")?.to_string(),
            rest_secs: reader.get_u32("rest_secs"),
            requires_weight: reader
                .get("requires_weight")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "1")),
            notes: reader.get_string("notes"),
        })
    }

    fn write(&self, writer: &mut RowWriter) {
        writer.set("user_email", self.user_email.clone());
        writer.set("exercise", self.exercise.clone());
        writer.set_opt("rest_secs", &self.rest_secs);
        if let Some(requires_weight) = self.requires_weight {
            writer.set_bool("requires_weight", requires_weight);
        }
        writer.set_opt("notes", &self.notes);
    }
}

impl SheetSchema for ExerciseNote {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec { name: "session_id", variants: &["SessionId", "session_id", "Session"], fallback: 0 },
        FieldSpec { name: "exercise", variants: &["Exercise", "ExerciseKey", "exercise_key"], fallback: 1 },
        FieldSpec { name: "note", variants: &["Note", "Notes"], fallback: 2 },
        FieldSpec { name: "created_at", variants: &["CreatedAt", "created_at"], fallback: 3 },
    ];

    fn from_row(reader: &RowReader) -> Result<Self, CodecError> {
        Ok(ExerciseNote {
            session_id: reader.require("session_id")?.to_string(),
            exercise: reader.require("exercise")?.to_string(),
            note: reader.get_string("note").unwrap_or_default(),
            created_at: reader.get_datetime("created_at").unwrap_or_else(Utc::now),
        })
    }

    fn write(&self, writer: &mut RowWriter) {
        writer.set("session_id", self.session_id.clone());
        writer.set("exercise", self.exercise.clone());
        writer.set("note", self.note.clone());
        writer.set("created_at", self.created_at.to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use shared::model::{Rpe, Weight};

    use super::*;

    fn header<T: SheetSchema>() -> Vec<String> {
        // Canonical spelling, canonical order
        T::FIELDS.iter().map(|f| f.variants[0].to_string()).collect()
    }

    #[test]
    fn set_entry_round_trips_through_the_codec() {
        let entry = SetEntry {
            id: Uuid::new_v4(),
            session_id: "sess-1".to_string(),
            exercise: "bench_press".to_string(),
            set_number: 3,
            weight: Weight::Kg(102.5),
            reps: 5,
            rpe: Some(Rpe::from_f64(8.5).unwrap()),
            skipped: false,
            skip_reason: None,
            rest_taken_secs: Some(95),
            rest_target_secs: Some(90),
            notes: Some("paused reps".to_string()),
            deleted: false,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap(),
        };

        let index = HeaderIndex::resolve(&header::<SetEntry>(), SetEntry::FIELDS);
        let row = entry.encode(&index);
        let decoded = SetEntry::decode(&index, &row).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn skipped_bodyweight_set_round_trips() {
        let entry = SetEntry {
            id: Uuid::new_v4(),
            session_id: "sess-1".to_string(),
            exercise: "pull_up".to_string(),
            set_number: 1,
            weight: Weight::Bodyweight,
            reps: 0,
            rpe: None,
            skipped: true,
            skip_reason: Some("elbow pain".to_string()),
            rest_taken_secs: None,
            rest_target_secs: Some(120),
            notes: None,
            deleted: false,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap(),
        };

        let index = HeaderIndex::resolve(&header::<SetEntry>(), SetEntry::FIELDS);
        let decoded = SetEntry::decode(&index, &entry.encode(&index)).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn set_entry_survives_a_reordered_header() {
        let entry = SetEntry {
            id: Uuid::new_v4(),
            session_id: "sess-2".to_string(),
            exercise: "squat".to_string(),
            set_number: 2,
            weight: Weight::Kg(140.0),
            reps: 3,
            rpe: None,
            skipped: false,
            skip_reason: None,
            rest_taken_secs: None,
            rest_target_secs: None,
            notes: None,
            deleted: false,
            created_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        };

        let mut names = header::<SetEntry>();
        names.reverse();
        let index = HeaderIndex::resolve(&names, SetEntry::FIELDS);
        let decoded = SetEntry::decode(&index, &entry.encode(&index)).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn set_row_without_id_is_an_error() {
        let index = HeaderIndex::resolve(&header::<SetEntry>(), SetEntry::FIELDS);
        let row = vec![String::new(); index.width()];
        assert!(matches!(
            SetEntry::decode(&index, &row),
            Err(CodecError::MissingRequiredValue { field: "id" })
        ));
    }

    #[test]
    fn plan_entry_decodes_with_missing_optionals() {
        let index = HeaderIndex::resolve(&header::<PlanEntry>(), PlanEntry::FIELDS);
        let row: Vec<String> = vec![
            "user@example.com".into(),
            "monday".into(),
            "deadlift".into(),
            "1".into(),
            "3".into(),
            "3-5".into(),
        ];
        let entry = PlanEntry::decode(&index, &row).unwrap();
        assert_eq!(entry.planned_sets, 3);
        assert_eq!(entry.rep_range, RepRange { low: 3, high: 5 });
        assert_eq!(entry.rest_secs, None);
        assert_eq!(entry.video_url, None);
    }
}
