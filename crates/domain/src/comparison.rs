use std::cmp::Ordering;

use crate::exercise::{ExerciseVariant, SetID, SetRecord};

/// The four rankable set metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Weight,
    Reps,
    Distance,
    Time,
}

impl Metric {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Metric::Weight => "weight",
            Metric::Reps => "reps",
            Metric::Distance => "distance",
            Metric::Time => "time",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    HigherWins,
    LowerWins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Criterion {
    pub metric: Metric,
    pub direction: Direction,
}

impl Criterion {
    const fn higher(metric: Metric) -> Self {
        Self {
            metric,
            direction: Direction::HigherWins,
        }
    }

    const fn lower(metric: Metric) -> Self {
        Self {
            metric,
            direction: Direction::LowerWins,
        }
    }

    fn compare(self, a: &SetRecord, b: &SetRecord) -> Ordering {
        let (a, b) = (self.value(a), self.value(b));
        match self.direction {
            Direction::HigherWins => a.total_cmp(&b),
            Direction::LowerWins => b.total_cmp(&a),
        }
    }

    /// The numeric value of the criterion's metric. An absent field counts as
    /// zero, except for a "lower is better" criterion where it counts as
    /// positive infinity so that a present value always beats an absent one.
    fn value(self, set: &SetRecord) -> f32 {
        let absent = match self.direction {
            Direction::HigherWins => 0.0,
            Direction::LowerWins => f32::INFINITY,
        };
        match self.metric {
            Metric::Weight => set.weight.map_or(absent, f32::from),
            Metric::Reps => set.reps.map_or(absent, f32::from),
            Metric::Distance => set.distance.map_or(absent, f32::from),
            Metric::Time => set.time.map_or(absent, f32::from),
        }
    }

    fn description(self) -> String {
        let direction = match self.direction {
            Direction::HigherWins => "higher wins",
            Direction::LowerWins => "lower wins",
        };
        format!("{} ({direction})", self.metric.label())
    }
}

/// How sets of one measurement scheme are ranked: a primary criterion and an
/// optional tie-break applied on primary equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComparisonRule {
    pub primary: Criterion,
    pub tie_break: Option<Criterion>,
}

impl ExerciseVariant {
    /// The ranking rule of this variant. Every variant is enumerated
    /// explicitly; there is no fallback rule.
    #[must_use]
    pub const fn comparison_rule(self) -> ComparisonRule {
        let (primary, tie_break) = match self {
            ExerciseVariant::WeightReps => (
                Criterion::higher(Metric::Weight),
                Some(Criterion::higher(Metric::Reps)),
            ),
            ExerciseVariant::Weight => (Criterion::higher(Metric::Weight), None),
            ExerciseVariant::Reps => (Criterion::higher(Metric::Reps), None),
            ExerciseVariant::Distance => (Criterion::higher(Metric::Distance), None),
            ExerciseVariant::TimeDuration => (Criterion::higher(Metric::Time), None),
            ExerciseVariant::TimeSpeed => (Criterion::lower(Metric::Time), None),
            ExerciseVariant::DistanceTime => (
                Criterion::higher(Metric::Distance),
                Some(Criterion::lower(Metric::Time)),
            ),
            ExerciseVariant::WeightTime => (
                Criterion::higher(Metric::Weight),
                Some(Criterion::lower(Metric::Time)),
            ),
            ExerciseVariant::RepsTime => (
                Criterion::higher(Metric::Reps),
                Some(Criterion::lower(Metric::Time)),
            ),
            ExerciseVariant::WeightDistance => (
                Criterion::higher(Metric::Weight),
                Some(Criterion::higher(Metric::Distance)),
            ),
            ExerciseVariant::RepsDistance => (
                Criterion::higher(Metric::Reps),
                Some(Criterion::higher(Metric::Distance)),
            ),
        };
        ComparisonRule { primary, tie_break }
    }
}

/// Rank two sets under the variant's rule. `Greater` means `a` outranks `b`.
/// Never panics; all inputs are treated as numeric with documented defaults.
#[must_use]
pub fn compare_sets(a: &SetRecord, b: &SetRecord, variant: ExerciseVariant) -> Ordering {
    let rule = variant.comparison_rule();
    rule.primary.compare(a, b).then_with(|| {
        rule.tie_break
            .map_or(Ordering::Equal, |tie_break| tie_break.compare(a, b))
    })
}

/// The highest-ranked set of the sequence, `None` for an empty sequence.
/// On exact ties the earliest entry wins.
#[must_use]
pub fn find_best_set(sets: &[SetRecord], variant: ExerciseVariant) -> Option<&SetRecord> {
    sets.iter().reduce(|best, candidate| {
        if compare_sets(candidate, best, variant) == Ordering::Greater {
            candidate
        } else {
            best
        }
    })
}

/// Identifier of the best set, for highlighting. `None` on empty input.
#[must_use]
pub fn find_best_set_id(sets: &[SetRecord], variant: ExerciseVariant) -> Option<SetID> {
    find_best_set(sets, variant).map(|set| set.id)
}

/// Whether `new_set` beats the current personal best. The first recorded
/// effort is unconditionally a personal best.
#[must_use]
pub fn is_new_personal_best(
    new_set: &SetRecord,
    current_best: Option<&SetRecord>,
    variant: ExerciseVariant,
) -> bool {
    current_best.is_none_or(|best| compare_sets(new_set, best, variant) == Ordering::Greater)
}

/// Human-readable restatement of the variant's ranking rule, derived from the
/// same rule table as `compare_sets`.
#[must_use]
pub fn comparison_description(variant: ExerciseVariant) -> String {
    let rule = variant.comparison_rule();
    match rule.tie_break {
        Some(tie_break) => format!(
            "{}, then {}",
            rule.primary.description(),
            tie_break.description()
        ),
        None => rule.primary.description(),
    }
}

/// The primary-metric value of a set, as plotted in trend charts.
#[must_use]
pub fn primary_metric_value(set: &SetRecord, variant: ExerciseVariant) -> f32 {
    variant.comparison_rule().primary.value(set)
}
