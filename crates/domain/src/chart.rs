use std::{cmp::Ordering, collections::BTreeMap};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    calendar::DateRange,
    comparison::{compare_sets, find_best_set, primary_metric_value},
    exercise::{ExerciseVariant, LoggedExercise, Name, SetRecord},
};

/// Supported history windows for trend charts, in days ending today.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartPeriod {
    _1W = 7,
    #[default]
    _1M = 30,
    _3M = 91,
    _6M = 182,
    _1Y = 365,
}

impl ChartPeriod {
    #[must_use]
    pub const fn days(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub fn range_ending(self, end: NaiveDate) -> DateRange {
        DateRange {
            start: end - Duration::days(self.days() - 1),
            end,
        }
    }
}

/// An exercise picked for charting, with its assigned display color.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseSelection {
    pub name: Name,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDataPoint {
    pub date: NaiveDate,
    pub value: f32,
}

/// Chart payload per selected exercise: a lightweight best-value series for
/// plotting and the detailed per-day set history for drill-down.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseCharts {
    pub best_values: BTreeMap<Name, Vec<ChartDataPoint>>,
    pub histories: BTreeMap<Name, Vec<LoggedExercise>>,
}

/// Reduce a history to one point per day: the primary-metric value of the
/// day's best set.
#[must_use]
pub fn best_value_per_day(history: &[LoggedExercise]) -> Vec<ChartDataPoint> {
    let mut best_by_date: BTreeMap<NaiveDate, (&SetRecord, ExerciseVariant)> = BTreeMap::new();
    for entry in history {
        if let Some(best) = find_best_set(&entry.sets, entry.variant) {
            best_by_date
                .entry(entry.date)
                .and_modify(|(current, variant)| {
                    if compare_sets(best, current, *variant) == Ordering::Greater {
                        *current = best;
                    }
                })
                .or_insert((best, entry.variant));
        }
    }
    best_by_date
        .into_iter()
        .map(|(date, (set, variant))| ChartDataPoint {
            date,
            value: primary_metric_value(set, variant),
        })
        .collect()
}
