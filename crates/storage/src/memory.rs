use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
};

use chrono::NaiveDate;
use gymlog_domain::{
    ChartDataPoint, DateRange, ExerciseSummary, LoggedExercise, Name, PreferenceRepository,
    ReadError, StorageError, TrainingLogRepository, WriteError, chart,
};
use log::debug;

/// In-memory repository, primarily for tests and offline demos. Records are
/// kept in insertion order; preferences are string-keyed JSON values.
#[derive(Default)]
pub struct Storage {
    exercises: RefCell<Vec<LoggedExercise>>,
    preferences: RefCell<BTreeMap<String, serde_json::Value>>,
    offline: Cell<bool>,
}

impl Storage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load logged exercises from a JSON array. Validation of values, tags
    /// and dates happens during deserialization.
    pub fn from_json(records: &str) -> Result<Self, StorageError> {
        let exercises: Vec<LoggedExercise> = serde_json::from_str(records)
            .map_err(|err| StorageError::Malformed(err.to_string()))?;
        debug!("loaded {} logged exercises", exercises.len());
        Ok(Self {
            exercises: RefCell::new(exercises),
            ..Self::default()
        })
    }

    pub fn log_exercise(&self, exercise: LoggedExercise) {
        self.exercises.borrow_mut().push(exercise);
    }

    /// Simulate loss of the backing store. While offline every repository
    /// call fails with `StorageError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    fn connection(&self) -> Result<(), StorageError> {
        if self.offline.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

impl TrainingLogRepository for Storage {
    async fn read_logged_dates(&self, range: DateRange) -> Result<BTreeSet<NaiveDate>, ReadError> {
        self.connection()?;
        Ok(self
            .exercises
            .borrow()
            .iter()
            .map(|exercise| exercise.date)
            .filter(|date| range.contains(*date))
            .collect())
    }

    async fn read_logged_exercises(&self) -> Result<Vec<LoggedExercise>, ReadError> {
        self.connection()?;
        Ok(self.exercises.borrow().clone())
    }

    async fn read_exercise_summaries(&self) -> Result<Vec<ExerciseSummary>, ReadError> {
        self.connection()?;
        let distinct: BTreeMap<Name, ExerciseSummary> = self
            .exercises
            .borrow()
            .iter()
            .map(|exercise| {
                (
                    exercise.name.clone(),
                    ExerciseSummary {
                        name: exercise.name.clone(),
                        variant: exercise.variant,
                    },
                )
            })
            .collect();
        Ok(distinct.into_values().collect())
    }

    async fn read_exercise_best_values(
        &self,
        name: &Name,
        range: DateRange,
    ) -> Result<Vec<ChartDataPoint>, ReadError> {
        let history = self.read_exercise_history(name, range).await?;
        Ok(chart::best_value_per_day(&history))
    }

    async fn read_exercise_history(
        &self,
        name: &Name,
        range: DateRange,
    ) -> Result<Vec<LoggedExercise>, ReadError> {
        self.connection()?;
        Ok(self
            .exercises
            .borrow()
            .iter()
            .filter(|exercise| exercise.name == *name && range.contains(exercise.date))
            .cloned()
            .collect())
    }
}

impl PreferenceRepository for Storage {
    async fn read_preference(&self, key: &str) -> Result<Option<serde_json::Value>, ReadError> {
        self.connection()?;
        Ok(self.preferences.borrow().get(key).cloned())
    }

    async fn write_preference(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), WriteError> {
        self.connection()?;
        self.preferences.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gymlog_domain::{
        ExerciseVariant, Reps, SetRecord, Weight, calendar,
        exercise::{ExerciseID, LoggedExerciseID, SetID},
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        calendar::parse_date_string(s).unwrap()
    }

    fn squat(id: u128, day: &str, weight: f32, reps: u32) -> LoggedExercise {
        LoggedExercise {
            id: LoggedExerciseID::from(id),
            definition_id: ExerciseID::from(1),
            name: Name::new("Squat").unwrap(),
            variant: ExerciseVariant::WeightReps,
            date: date(day),
            sets: vec![SetRecord {
                id: SetID::from(id),
                weight: Some(Weight::new(weight).unwrap()),
                reps: Some(Reps::new(reps).unwrap()),
                distance: None,
                time: None,
                note: None,
            }],
        }
    }

    fn seeded() -> Storage {
        let storage = Storage::new();
        storage.log_exercise(squat(1, "2024-01-01", 100.0, 5));
        storage.log_exercise(squat(2, "2024-01-01", 102.5, 3));
        storage.log_exercise(squat(3, "2024-01-10", 95.0, 8));
        storage
    }

    fn january() -> DateRange {
        DateRange {
            start: date("2024-01-01"),
            end: date("2024-01-31"),
        }
    }

    #[rstest]
    #[case::full_month("2024-01-01", "2024-01-31", &["2024-01-01", "2024-01-10"])]
    #[case::partial_month("2024-01-01", "2024-01-05", &["2024-01-01"])]
    #[case::boundary_inclusive("2024-01-10", "2024-02-01", &["2024-01-10", "2024-02-01"])]
    #[case::outside("2024-02-02", "2024-02-29", &[])]
    #[tokio::test]
    async fn test_read_logged_dates_within_range(
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: &[&str],
    ) {
        let storage = seeded();
        storage.log_exercise(squat(4, "2024-02-01", 90.0, 5));
        let range = DateRange {
            start: date(start),
            end: date(end),
        };
        assert_eq!(
            storage.read_logged_dates(range).await.unwrap(),
            expected.iter().map(|d| date(d)).collect::<BTreeSet<_>>()
        );
    }

    #[tokio::test]
    async fn test_read_exercise_summaries_distinct_by_name() {
        let storage = seeded();
        let summaries = storage.read_exercise_summaries().await.unwrap();
        assert_eq!(
            summaries,
            [ExerciseSummary {
                name: Name::new("Squat").unwrap(),
                variant: ExerciseVariant::WeightReps,
            }]
        );
    }

    #[tokio::test]
    async fn test_read_exercise_best_values() {
        let storage = seeded();
        let best = storage
            .read_exercise_best_values(&Name::new("Squat").unwrap(), january())
            .await
            .unwrap();
        assert_eq!(
            best,
            [
                ChartDataPoint {
                    date: date("2024-01-01"),
                    value: 102.5,
                },
                ChartDataPoint {
                    date: date("2024-01-10"),
                    value: 95.0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_read_exercise_history_filters_by_name() {
        let storage = seeded();
        let history = storage
            .read_exercise_history(&Name::new("Deadlift").unwrap(), january())
            .await
            .unwrap();
        assert_eq!(history, []);
    }

    #[tokio::test]
    async fn test_from_json() {
        let storage = Storage::from_json(
            r#"[{
                "id": "00000000-0000-0000-0000-000000000001",
                "definition_id": "00000000-0000-0000-0000-000000000002",
                "name": "Plank",
                "variant": "time_duration",
                "date": "2024-01-03",
                "sets": [{
                    "id": "00000000-0000-0000-0000-000000000003",
                    "time": 90.0
                }]
            }]"#,
        )
        .unwrap();
        let exercises = storage.read_logged_exercises().await.unwrap();
        assert_eq!(exercises.len(), 1);
        assert_eq!(exercises[0].variant, ExerciseVariant::TimeDuration);
    }

    #[test]
    fn test_from_json_rejects_unknown_variant_tag() {
        let result = Storage::from_json(
            r#"[{
                "id": "00000000-0000-0000-0000-000000000001",
                "definition_id": "00000000-0000-0000-0000-000000000002",
                "name": "Rowing",
                "variant": "cardio",
                "date": "2024-01-03",
                "sets": []
            }]"#,
        );
        assert!(matches!(result, Err(StorageError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_preference_round_trip() {
        let storage = Storage::new();
        assert_eq!(storage.read_preference("theme").await.unwrap(), None);
        storage
            .write_preference("theme", json!("dark"))
            .await
            .unwrap();
        assert_eq!(
            storage.read_preference("theme").await.unwrap(),
            Some(json!("dark"))
        );
    }

    #[tokio::test]
    async fn test_offline_fails_reads_and_writes() {
        let storage = seeded();
        storage.set_offline(true);
        assert!(matches!(
            storage.read_logged_exercises().await,
            Err(ReadError::Storage(StorageError::Unavailable))
        ));
        assert!(matches!(
            storage.write_preference("theme", json!("dark")).await,
            Err(WriteError::Storage(StorageError::Unavailable))
        ));
        storage.set_offline(false);
        assert!(storage.read_logged_exercises().await.is_ok());
    }
}
