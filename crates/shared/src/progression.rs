//! Workout progression: which exercise and set is live, the rest timer
//! between sets, and the draft inputs for the upcoming set.
//!
//! The whole state is one serde-serializable value object. The browser
//! persists the snapshot in local storage and the server keeps its copy in
//! the session store, so a reload resumes exactly where the user left off.
//!
//! Advancement is gated on the remote write: handlers append the set row to
//! the sheet first and call [`ProgressionState::confirm_set`] only once the
//! append has been acknowledged. A failed write surfaces as an error with
//! the local indices untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Weight;

/// `min(planned_sets, max logged set number + 1)`; 1 when nothing is logged
pub fn next_set_number(planned_sets: u32, logged_set_numbers: &[u32]) -> u32 {
    match logged_set_numbers.iter().max() {
        None => 1,
        Some(max) => (max + 1).min(planned_sets),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub key: String,
    pub planned_sets: u32,
    pub rest_secs: Option<u32>,
}

/// Rest countdown computed from wall-clock deltas rather than a decrementing
/// counter, so a backgrounded tab stays correct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestTimer {
    pub started_at: DateTime<Utc>,
    pub target_secs: u32,
    cue_fired: bool,
}

impl RestTimer {
    pub fn new(now: DateTime<Utc>, target_secs: u32) -> Self {
        Self { started_at: now, target_secs, cue_fired: false }
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.target_secs as i64 - self.elapsed_secs(now)).max(0)
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs(now) == 0
    }

    /// True exactly once, when the countdown first reaches zero. The
    /// audible cue keys off this
    pub fn should_cue(&mut self, now: DateTime<Utc>) -> bool {
        if self.expired(now) && !self.cue_fired {
            self.cue_fired = true;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Active { exercise_idx: usize, set_number: u32 },
    Resting { exercise_idx: usize, next_set_number: u32, timer: RestTimer },
    Finished,
}

/// What a confirmed set did to the progression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Next set of the same exercise, no rest configured
    NextSet,
    /// Next set of the same exercise after the rest countdown
    Resting,
    /// Exercise complete, moved on to the next one
    NextExercise,
    /// Every planned set of every exercise is logged
    SessionComplete,
}

/// Weight/reps typed for an upcoming set but not yet persisted. Keyed by
/// (exercise, set number) so navigating away and back doesn't lose input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub exercise: String,
    pub set_number: u32,
    pub weight: Option<Weight>,
    pub reps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("exercise {key:?} is not part of this session's plan")]
pub struct UnknownExercise {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub session_id: String,
    exercises: Vec<PlannedExercise>,
    /// Confirmed set count per exercise, parallel to `exercises`
    logged: Vec<u32>,
    phase: Phase,
    pub started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    drafts: Vec<Draft>,
}

impl ProgressionState {
    pub fn new(session_id: String, exercises: Vec<PlannedExercise>, now: DateTime<Utc>) -> Self {
        let logged = vec![0; exercises.len()];
        Self {
            session_id,
            exercises,
            logged,
            phase: Phase::NotStarted,
            started_at: now,
            ended_at: None,
            drafts: Vec::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn exercises(&self) -> &[PlannedExercise] {
        &self.exercises
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    fn index_of(&self, key: &str) -> Result<usize, UnknownExercise> {
        self.exercises
            .iter()
            .position(|e| e.key == key)
            .ok_or_else(|| UnknownExercise { key: key.to_string() })
    }

    fn complete_at(&self, idx: usize) -> bool {
        self.logged[idx] >= self.exercises[idx].planned_sets
    }

    fn first_incomplete(&self, from: usize) -> Option<usize> {
        (from..self.exercises.len())
            .chain(0..from)
            .find(|&i| !self.complete_at(i))
    }

    pub fn is_complete(&self) -> bool {
        self.first_incomplete(0).is_none()
    }

    pub fn completed_exercises(&self) -> u32 {
        (0..self.exercises.len()).filter(|&i| self.complete_at(i)).count() as u32
    }

    pub fn total_sets(&self) -> u32 {
        self.logged.iter().sum()
    }

    /// Set number the next save for this exercise should carry
    pub fn next_set_for(&self, key: &str) -> Result<u32, UnknownExercise> {
        let idx = self.index_of(key)?;
        let logged: Vec<u32> = (1..=self.logged[idx]).collect();
        Ok(next_set_number(self.exercises[idx].planned_sets, &logged))
    }

    /// Leave `NotStarted` for the first incomplete exercise
    pub fn start(&mut self) {
        if self.phase == Phase::NotStarted {
            self.phase = match self.first_incomplete(0) {
                Some(idx) => Phase::Active { exercise_idx: idx, set_number: self.logged[idx] + 1 },
                None => Phase::Finished,
            };
        }
    }

    /// Record that a set (saved or skipped) for `key` has been acknowledged
    /// by the backend, and advance. Must not be called before the remote
    /// append succeeds
    pub fn confirm_set(
        &mut self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<Advance, UnknownExercise> {
        let idx = self.index_of(key)?;
        self.logged[idx] += 1;
        let confirmed = self.logged[idx];
        self.drafts.retain(|d| !(d.exercise == key && d.set_number == confirmed));

        let advance = if self.is_complete() {
            self.phase = Phase::Finished;
            Advance::SessionComplete
        } else if self.complete_at(idx) {
            // unwrap is fine, is_complete was false
            let next = self.first_incomplete(idx).unwrap();
            self.phase = Phase::Active { exercise_idx: next, set_number: self.logged[next] + 1 };
            Advance::NextExercise
        } else {
            let next_set_number = self.logged[idx] + 1;
            match self.exercises[idx].rest_secs {
                Some(target) if target > 0 => {
                    self.phase = Phase::Resting {
                        exercise_idx: idx,
                        next_set_number,
                        timer: RestTimer::new(now, target),
                    };
                    Advance::Resting
                },
                _ => {
                    self.phase = Phase::Active { exercise_idx: idx, set_number: next_set_number };
                    Advance::NextSet
                },
            }
        };
        Ok(advance)
    }

    /// Dismiss the rest countdown (timer done or user skipped it)
    pub fn finish_rest(&mut self) {
        if let Phase::Resting { exercise_idx, next_set_number, .. } = self.phase {
            self.phase = Phase::Active { exercise_idx, set_number: next_set_number };
        }
    }

    /// Stamp the end of the session. Idempotent: re-running the completion
    /// check never produces a second timestamp. Returns whether this call
    /// was the one that stamped
    pub fn finish(&mut self, now: DateTime<Utc>) -> bool {
        self.phase = Phase::Finished;
        if self.ended_at.is_none() {
            self.ended_at = Some(now);
            true
        } else {
            false
        }
    }

    pub fn set_draft(&mut self, draft: Draft) {
        match self
            .drafts
            .iter_mut()
            .find(|d| d.exercise == draft.exercise && d.set_number == draft.set_number)
        {
            Some(existing) => *existing = draft,
            None => self.drafts.push(draft),
        }
    }

    pub fn draft(&self, exercise: &str, set_number: u32) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.exercise == exercise && d.set_number == set_number)
    }
}
