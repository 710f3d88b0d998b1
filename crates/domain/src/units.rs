use std::fmt;

use serde::{Deserialize, Serialize};

pub const LBS_PER_KG: f64 = 2.204_622_621_8;
pub const MILES_PER_KM: f64 = 0.621_371;
pub const KM_PER_MILE: f64 = 1.609_344;

const SECONDS_PER_HOUR: u32 = 3600;
const SECONDS_PER_MINUTE: u32 = 60;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WeightUnit::Kg => "kg",
                WeightUnit::Lbs => "lbs",
            }
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    Miles,
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DistanceUnit::Km => "km",
                DistanceUnit::Miles => "mi",
            }
        )
    }
}

/// Display conversion rounded to the nearest 0.5 lb (gym-plate granularity).
///
/// The rounding is lossy on purpose and the result must never be written back
/// into canonical storage.
#[must_use]
pub fn kg_to_lbs(kg: f32) -> f32 {
    round(f64::from(kg) * LBS_PER_KG, 2.0)
}

/// Input conversion rounded to 2 decimal places.
#[must_use]
pub fn lbs_to_kg(lbs: f32) -> f32 {
    round(f64::from(lbs) / LBS_PER_KG, 100.0)
}

/// Display conversion rounded to 2 decimal places.
#[must_use]
pub fn km_to_miles(km: f32) -> f32 {
    round(f64::from(km) * MILES_PER_KM, 100.0)
}

/// Input conversion rounded to 3 decimal places.
#[must_use]
pub fn miles_to_km(miles: f32) -> f32 {
    round(f64::from(miles) * KM_PER_MILE, 1000.0)
}

#[allow(clippy::cast_possible_truncation)]
fn round(value: f64, steps_per_unit: f64) -> f32 {
    ((value * steps_per_unit).round() / steps_per_unit) as f32
}

/// Format a canonical weight (kg) in the preferred unit.
#[must_use]
pub fn format_weight(kg: f32, unit: WeightUnit, precision: usize, with_suffix: bool) -> String {
    let value = match unit {
        WeightUnit::Kg => kg,
        WeightUnit::Lbs => kg_to_lbs(kg),
    };
    if with_suffix {
        format!("{value:.precision$} {unit}")
    } else {
        format!("{value:.precision$}")
    }
}

/// Format a canonical distance (km) in the preferred unit.
#[must_use]
pub fn format_distance(km: f32, unit: DistanceUnit, precision: usize, with_suffix: bool) -> String {
    let value = match unit {
        DistanceUnit::Km => km,
        DistanceUnit::Miles => km_to_miles(km),
    };
    if with_suffix {
        format!("{value:.precision$} {unit}")
    } else {
        format!("{value:.precision$}")
    }
}

/// Format a canonical time (seconds) as `M:SS`, or `H:MM:SS` from one hour.
#[must_use]
pub fn format_duration(seconds: f32) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.max(0.0).round() as u32;
    let hours = total / SECONDS_PER_HOUR;
    let minutes = total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE;
    let secs = total % SECONDS_PER_MINUTE;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
