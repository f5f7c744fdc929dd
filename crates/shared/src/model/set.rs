use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Load on the bar for one set
///
/// Bodyweight movements carry no number in the sheet; they multiply as 1 in
/// the weight*reps product so they don't collapse it to zero
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Weight {
    #[default]
    Bodyweight,
    Kg(f64),
}

impl Weight {
    /// Contribution to the max-weight record. Bodyweight counts as zero
    pub fn as_kg(&self) -> f64 {
        match self {
            Weight::Bodyweight => 0.0,
            Weight::Kg(kg) => *kg,
        }
    }

    /// Multiplier for the weight*reps product. Zero or absent weight
    /// multiplies as 1
    pub fn product_multiplier(&self) -> f64 {
        match self {
            Weight::Kg(kg) if *kg > 0.0 => *kg,
            _ => 1.0,
        }
    }
}

// On the wire a weight is just an optional number
impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Weight::Bodyweight => serializer.serialize_none(),
            Weight::Kg(kg) => serializer.serialize_some(kg),
        }
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            None => Weight::Bodyweight,
            Some(kg) => Weight::Kg(kg),
        })
    }
}

/// Rate of Perceived Exertion, 1.0 to 10.0 in half-point steps
///
/// Stored internally as half-steps so equality and ordering are exact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rpe(u8);

impl Rpe {
    pub fn from_f64(value: f64) -> Result<Self, RpeOutOfRange> {
        let half_steps = value * 2.0;
        if half_steps.fract() != 0.0 || !(2.0..=20.0).contains(&half_steps) {
            return Err(RpeOutOfRange { value });
        }
        Ok(Rpe(half_steps as u8))
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("RPE must be 1-10 in half-point steps, got {value}")]
pub struct RpeOutOfRange {
    pub value: f64,
}

impl Serialize for Rpe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Rpe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Rpe::from_f64(value).map_err(de::Error::custom)
    }
}

/// One performed (or explicitly skipped) set, as stored in the Sets tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    pub id: Uuid,
    pub session_id: String,
    pub exercise: String,
    /// 1-based, contiguous per (session, exercise)
    pub set_number: u32,
    #[serde(default)]
    pub weight: Weight,
    pub reps: u32,
    pub rpe: Option<Rpe>,
    pub skipped: bool,
    pub skip_reason: Option<String>,
    pub rest_taken_secs: Option<u32>,
    pub rest_target_secs: Option<u32>,
    pub notes: Option<String>,
    /// Soft delete; rows are never removed from the sheet
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpe_accepts_half_steps() {
        assert_eq!(Rpe::from_f64(7.5).unwrap().as_f64(), 7.5);
        assert_eq!(Rpe::from_f64(1.0).unwrap().as_f64(), 1.0);
        assert_eq!(Rpe::from_f64(10.0).unwrap().as_f64(), 10.0);
    }

    #[test]
    fn rpe_rejects_out_of_range_and_quarter_steps() {
        assert!(Rpe::from_f64(0.5).is_err());
        assert!(Rpe::from_f64(10.5).is_err());
        assert!(Rpe::from_f64(7.25).is_err());
    }

    #[test]
    fn weight_serializes_as_optional_number() {
        assert_eq!(serde_json::to_string(&Weight::Kg(102.5)).unwrap(), "102.5");
        assert_eq!(serde_json::to_string(&Weight::Bodyweight).unwrap(), "null");
        assert_eq!(serde_json::from_str::<Weight>("null").unwrap(), Weight::Bodyweight);
        assert_eq!(serde_json::from_str::<Weight>("60").unwrap(), Weight::Kg(60.0));
    }

    #[test]
    fn bodyweight_multiplies_as_one() {
        assert_eq!(Weight::Bodyweight.product_multiplier(), 1.0);
        assert_eq!(Weight::Kg(0.0).product_multiplier(), 1.0);
        assert_eq!(Weight::Kg(80.0).product_multiplier(), 80.0);
    }
}
