use std::fmt;

use chrono::NaiveDate;
use derive_more::{AsRef, Deref, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Measurement scheme of an exercise. The variant statically determines which
/// set fields apply and how sets are ranked against each other.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExerciseVariant {
    WeightReps,
    Weight,
    Reps,
    Distance,
    TimeDuration,
    TimeSpeed,
    DistanceTime,
    WeightTime,
    RepsTime,
    WeightDistance,
    RepsDistance,
}

impl ExerciseVariant {
    /// Parse a stored variant tag. An unknown tag is a configuration error
    /// that must be reported to the caller, never mapped to a default.
    pub fn parse(tag: &str) -> Result<Self, ExerciseVariantError> {
        tag.parse()
            .map_err(|_| ExerciseVariantError::Unknown(tag.to_string()))
    }

    #[must_use]
    pub const fn fields(self) -> FieldSet {
        const NONE: FieldSet = FieldSet {
            weight: false,
            reps: false,
            distance: false,
            time: false,
        };
        match self {
            ExerciseVariant::WeightReps => FieldSet {
                weight: true,
                reps: true,
                ..NONE
            },
            ExerciseVariant::Weight => FieldSet {
                weight: true,
                ..NONE
            },
            ExerciseVariant::Reps => FieldSet { reps: true, ..NONE },
            ExerciseVariant::Distance => FieldSet {
                distance: true,
                ..NONE
            },
            ExerciseVariant::TimeDuration | ExerciseVariant::TimeSpeed => {
                FieldSet { time: true, ..NONE }
            }
            ExerciseVariant::DistanceTime => FieldSet {
                distance: true,
                time: true,
                ..NONE
            },
            ExerciseVariant::WeightTime => FieldSet {
                weight: true,
                time: true,
                ..NONE
            },
            ExerciseVariant::RepsTime => FieldSet {
                reps: true,
                time: true,
                ..NONE
            },
            ExerciseVariant::WeightDistance => FieldSet {
                weight: true,
                distance: true,
                ..NONE
            },
            ExerciseVariant::RepsDistance => FieldSet {
                reps: true,
                distance: true,
                ..NONE
            },
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseVariantError {
    #[error("Unknown exercise variant tag {0:?}")]
    Unknown(String),
}

/// Which of the four set metrics are meaningful for a variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub weight: bool,
    pub reps: bool,
    pub distance: bool,
    pub time: bool,
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut labels = vec![];
        if self.weight {
            labels.push("weight");
        }
        if self.reps {
            labels.push("reps");
        }
        if self.distance {
            labels.push("distance");
        }
        if self.time {
            labels.push("time");
        }
        write!(f, "{}", labels.join("+"))
    }
}

#[derive(
    AsRef,
    Debug,
    derive_more::Display,
    Clone,
    Into,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.len();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Name::new(&value)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}

/// Weight in kilograms, the canonical storage unit.
#[derive(
    Debug, derive_more::Display, Clone, Copy, Into, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(try_from = "f32", into = "f32")]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !value.is_finite() || !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<f32> for Weight {
    type Error = WeightError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(
    Debug,
    derive_more::Display,
    Clone,
    Copy,
    Into,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl From<Reps> for f32 {
    fn from(value: Reps) -> Self {
        #[allow(clippy::cast_precision_loss)]
        {
            value.0 as f32
        }
    }
}

impl TryFrom<u32> for Reps {
    type Error = RepsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Reps::new(value)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Distance in kilometers, the canonical storage unit.
#[derive(
    Debug, derive_more::Display, Clone, Copy, Into, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(try_from = "f32", into = "f32")]
pub struct Distance(f32);

impl Distance {
    pub fn new(value: f32) -> Result<Self, DistanceError> {
        if !value.is_finite() || !(0.0..1000.0).contains(&value) {
            return Err(DistanceError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<f32> for Distance {
    type Error = DistanceError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Distance::new(value)
    }
}

impl TryFrom<&str> for Distance {
    type Error = DistanceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Distance::new(parsed_value),
            Err(_) => Err(DistanceError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DistanceError {
    #[error("Distance must be in the range 0.0 to 999.9 km")]
    OutOfRange,
    #[error("Distance must be a decimal")]
    ParseError,
}

/// Time in seconds, the canonical storage unit.
#[derive(
    Debug, derive_more::Display, Clone, Copy, Into, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(try_from = "f32", into = "f32")]
pub struct Time(f32);

impl Time {
    pub fn new(value: f32) -> Result<Self, TimeError> {
        if !value.is_finite() || !(0.0..86400.0).contains(&value) {
            return Err(TimeError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<f32> for Time {
    type Error = TimeError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Time::new(value)
    }
}

impl TryFrom<&str> for Time {
    type Error = TimeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Time::new(parsed_value),
            Err(_) => Err(TimeError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Time must be in the range 0.0 to 86399.9 s")]
    OutOfRange,
    #[error("Time must be a decimal")]
    ParseError,
}

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Deref,
            Debug,
            Default,
            Clone,
            Copy,
            Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn nil() -> Self {
                Self(Uuid::nil())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(Uuid::from_bytes(value.to_be_bytes()))
            }
        }
    };
}

id_type!(SetID);
id_type!(ExerciseID);
id_type!(LoggedExerciseID);

/// A single logged effort. All numeric fields are stored in canonical units
/// (kg / km / seconds) regardless of display preference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SetRecord {
    pub id: SetID,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<Reps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SetRecord {
    /// Whether the populated fields exactly match the variant's descriptor.
    #[must_use]
    pub fn conforms_to(&self, variant: ExerciseVariant) -> bool {
        let fields = variant.fields();
        self.weight.is_some() == fields.weight
            && self.reps.is_some() == fields.reps
            && self.distance.is_some() == fields.distance
            && self.time.is_some() == fields.time
    }
}

/// All sets logged for one exercise on one date, ordered by entry sequence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggedExercise {
    pub id: LoggedExerciseID,
    pub definition_id: ExerciseID,
    pub name: Name,
    pub variant: ExerciseVariant,
    pub date: NaiveDate,
    pub sets: Vec<SetRecord>,
}

/// Usage summary of an exercise definition (name and measurement scheme).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub name: Name,
    pub variant: ExerciseVariant,
}
