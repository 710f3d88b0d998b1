use std::collections::BTreeSet;

use chrono::NaiveDate;
use futures_util::join;
use log::error;

use crate::{
    Agenda, ChartDataPoint, ChartPeriod, DateRange, ExerciseCharts, ExerciseSelection,
    ExerciseSummary, LoggedExercise, Name, ReadError, WriteError, agenda, calendar,
};

/// Storage collaborator for logged training data. Implementations materialize
/// the records; the aggregation itself lives in this crate.
#[allow(async_fn_in_trait)]
pub trait TrainingLogRepository {
    async fn read_logged_dates(&self, range: DateRange) -> Result<BTreeSet<NaiveDate>, ReadError>;
    async fn read_logged_exercises(&self) -> Result<Vec<LoggedExercise>, ReadError>;
    async fn read_exercise_summaries(&self) -> Result<Vec<ExerciseSummary>, ReadError>;
    async fn read_exercise_best_values(
        &self,
        name: &Name,
        range: DateRange,
    ) -> Result<Vec<ChartDataPoint>, ReadError>;
    async fn read_exercise_history(
        &self,
        name: &Name,
        range: DateRange,
    ) -> Result<Vec<LoggedExercise>, ReadError>;
}

/// Preference collaborator: string-keyed JSON values.
#[allow(async_fn_in_trait)]
pub trait PreferenceRepository {
    async fn read_preference(&self, key: &str) -> Result<Option<serde_json::Value>, ReadError>;
    async fn write_preference(&self, key: &str, value: serde_json::Value)
    -> Result<(), WriteError>;
}

impl<R: TrainingLogRepository> TrainingLogRepository for &R {
    async fn read_logged_dates(&self, range: DateRange) -> Result<BTreeSet<NaiveDate>, ReadError> {
        (**self).read_logged_dates(range).await
    }

    async fn read_logged_exercises(&self) -> Result<Vec<LoggedExercise>, ReadError> {
        (**self).read_logged_exercises().await
    }

    async fn read_exercise_summaries(&self) -> Result<Vec<ExerciseSummary>, ReadError> {
        (**self).read_exercise_summaries().await
    }

    async fn read_exercise_best_values(
        &self,
        name: &Name,
        range: DateRange,
    ) -> Result<Vec<ChartDataPoint>, ReadError> {
        (**self).read_exercise_best_values(name, range).await
    }

    async fn read_exercise_history(
        &self,
        name: &Name,
        range: DateRange,
    ) -> Result<Vec<LoggedExercise>, ReadError> {
        (**self).read_exercise_history(name, range).await
    }
}

impl<R: PreferenceRepository> PreferenceRepository for &R {
    async fn read_preference(&self, key: &str) -> Result<Option<serde_json::Value>, ReadError> {
        (**self).read_preference(key).await
    }

    async fn write_preference(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), WriteError> {
        (**self).write_preference(key, value).await
    }
}

/// Month overview: calendar marks joined with the agenda built from the same
/// snapshot of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub calendar_marks: std::collections::BTreeMap<NaiveDate, bool>,
    pub agenda: Agenda,
}

#[allow(async_fn_in_trait)]
pub trait TrainingLogService {
    async fn get_overview(
        &self,
        month: &str,
        buffer_months: u32,
        today: NaiveDate,
        show_rest_days: bool,
        days_to_show: usize,
    ) -> Result<Overview, ReadError>;
    async fn get_agenda(
        &self,
        today: NaiveDate,
        show_rest_days: bool,
        days_to_show: usize,
    ) -> Result<Agenda, ReadError>;
    async fn get_charts(
        &self,
        selection: &[ExerciseSelection],
        period: ChartPeriod,
        today: NaiveDate,
    ) -> Result<ExerciseCharts, ReadError>;
    async fn get_exercise_summaries(&self) -> Result<Vec<ExerciseSummary>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait PreferenceService {
    async fn get_preference(&self, key: &str) -> Result<Option<serde_json::Value>, ReadError>;
    async fn set_preference(&self, key: &str, value: serde_json::Value)
    -> Result<(), WriteError>;
}

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func:expr, $action:literal, $entity:literal) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            error!("failed to {} {}: {err}", $action, $entity);
        }
        result
    }};
}

impl<R: TrainingLogRepository> TrainingLogService for Service<R> {
    async fn get_overview(
        &self,
        month: &str,
        buffer_months: u32,
        today: NaiveDate,
        show_rest_days: bool,
        days_to_show: usize,
    ) -> Result<Overview, ReadError> {
        let range = calendar::calendar_date_range(month, buffer_months)
            .map_err(|err| ReadError::Other(err.into()))?;
        // Independent fetches, issued concurrently and joined.
        let (dates, exercises) = join!(
            async {
                log_on_error!(
                    self.repository.read_logged_dates(range),
                    "read",
                    "logged dates"
                )
            },
            async {
                log_on_error!(
                    self.repository.read_logged_exercises(),
                    "read",
                    "logged exercises"
                )
            },
        );
        Ok(Overview {
            calendar_marks: agenda::calendar_marks(&dates?, range),
            agenda: agenda::build_agenda(&exercises?, today, show_rest_days, days_to_show),
        })
    }

    async fn get_agenda(
        &self,
        today: NaiveDate,
        show_rest_days: bool,
        days_to_show: usize,
    ) -> Result<Agenda, ReadError> {
        let exercises = log_on_error!(
            self.repository.read_logged_exercises(),
            "read",
            "logged exercises"
        )?;
        Ok(agenda::build_agenda(
            &exercises,
            today,
            show_rest_days,
            days_to_show,
        ))
    }

    async fn get_charts(
        &self,
        selection: &[ExerciseSelection],
        period: ChartPeriod,
        today: NaiveDate,
    ) -> Result<ExerciseCharts, ReadError> {
        let range = period.range_ending(today);
        let mut charts = ExerciseCharts::default();
        // Dependent on the resolved selection list, so fetched sequentially.
        for exercise in selection {
            let best_values = log_on_error!(
                self.repository.read_exercise_best_values(&exercise.name, range),
                "read",
                "exercise best values"
            )?;
            let history = log_on_error!(
                self.repository.read_exercise_history(&exercise.name, range),
                "read",
                "exercise history"
            )?;
            charts.best_values.insert(exercise.name.clone(), best_values);
            charts.histories.insert(exercise.name.clone(), history);
        }
        Ok(charts)
    }

    async fn get_exercise_summaries(&self) -> Result<Vec<ExerciseSummary>, ReadError> {
        log_on_error!(
            self.repository.read_exercise_summaries(),
            "read",
            "exercise summaries"
        )
    }
}

impl<R: PreferenceRepository> PreferenceService for Service<R> {
    async fn get_preference(&self, key: &str) -> Result<Option<serde_json::Value>, ReadError> {
        log_on_error!(
            self.repository.read_preference(key),
            "read",
            "preference"
        )
    }

    async fn set_preference(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), WriteError> {
        log_on_error!(
            self.repository.write_preference(key, value),
            "write",
            "preference"
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::{
        ExerciseVariant, Name, Reps, SetRecord, StorageError, Weight, calendar, chart,
        exercise::{ExerciseID, LoggedExerciseID, SetID},
    };

    use super::*;

    struct FakeRepository {
        exercises: Vec<LoggedExercise>,
        preferences: RefCell<BTreeMap<String, serde_json::Value>>,
        available: bool,
    }

    impl FakeRepository {
        fn new(exercises: Vec<LoggedExercise>) -> Self {
            Self {
                exercises,
                preferences: RefCell::new(BTreeMap::new()),
                available: true,
            }
        }

        fn check(&self) -> Result<(), StorageError> {
            if self.available {
                Ok(())
            } else {
                Err(StorageError::Unavailable)
            }
        }
    }

    impl TrainingLogRepository for FakeRepository {
        async fn read_logged_dates(
            &self,
            range: DateRange,
        ) -> Result<BTreeSet<NaiveDate>, ReadError> {
            self.check()?;
            Ok(self
                .exercises
                .iter()
                .map(|e| e.date)
                .filter(|d| range.contains(*d))
                .collect())
        }

        async fn read_logged_exercises(&self) -> Result<Vec<LoggedExercise>, ReadError> {
            self.check()?;
            Ok(self.exercises.clone())
        }

        async fn read_exercise_summaries(&self) -> Result<Vec<ExerciseSummary>, ReadError> {
            self.check()?;
            Ok(self
                .exercises
                .iter()
                .map(|e| ExerciseSummary {
                    name: e.name.clone(),
                    variant: e.variant,
                })
                .collect())
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
            self.check()?;
            Ok(self
                .exercises
                .iter()
                .filter(|e| e.name == *name && range.contains(e.date))
                .cloned()
                .collect())
        }
    }

    impl PreferenceRepository for FakeRepository {
        async fn read_preference(
            &self,
            key: &str,
        ) -> Result<Option<serde_json::Value>, ReadError> {
            self.check()?;
            Ok(self.preferences.borrow().get(key).cloned())
        }

        async fn write_preference(
            &self,
            key: &str,
            value: serde_json::Value,
        ) -> Result<(), WriteError> {
            self.check()?;
            self.preferences.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }
    }

    fn date(s: &str) -> NaiveDate {
        calendar::parse_date_string(s).unwrap()
    }

    fn squat(id: u128, day: &str, weight: f32) -> LoggedExercise {
        LoggedExercise {
            id: LoggedExerciseID::from(id),
            definition_id: ExerciseID::from(1),
            name: Name::new("Squat").unwrap(),
            variant: ExerciseVariant::WeightReps,
            date: date(day),
            sets: vec![SetRecord {
                id: SetID::from(id),
                weight: Some(Weight::new(weight).unwrap()),
                reps: Some(Reps::new(5).unwrap()),
                distance: None,
                time: None,
                note: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_get_overview() {
        let service = Service::new(FakeRepository::new(vec![
            squat(1, "2024-01-01", 100.0),
            squat(2, "2024-01-03", 102.5),
        ]));
        let overview = service
            .get_overview("2024-01", 0, date("2024-01-03"), true, 10)
            .await
            .unwrap();
        assert_eq!(overview.calendar_marks.len(), 31);
        assert!(overview.calendar_marks[&date("2024-01-03")]);
        assert!(!overview.calendar_marks[&date("2024-01-02")]);
        assert_eq!(overview.agenda.sections.len(), 3);
    }

    /// Records call order while suspending the dates fetch, so an overview
    /// that serialized its fetches would finish the dates read before the
    /// exercises read even starts.
    struct InterleavingRepository {
        events: Rc<RefCell<Vec<&'static str>>>,
    }

    impl TrainingLogRepository for InterleavingRepository {
        async fn read_logged_dates(
            &self,
            _range: DateRange,
        ) -> Result<BTreeSet<NaiveDate>, ReadError> {
            self.events.borrow_mut().push("dates:start");
            tokio::task::yield_now().await;
            self.events.borrow_mut().push("dates:end");
            Ok(BTreeSet::new())
        }

        async fn read_logged_exercises(&self) -> Result<Vec<LoggedExercise>, ReadError> {
            self.events.borrow_mut().push("exercises:start");
            self.events.borrow_mut().push("exercises:end");
            Ok(vec![])
        }

        async fn read_exercise_summaries(&self) -> Result<Vec<ExerciseSummary>, ReadError> {
            Ok(vec![])
        }

        async fn read_exercise_best_values(
            &self,
            _name: &Name,
            _range: DateRange,
        ) -> Result<Vec<ChartDataPoint>, ReadError> {
            Ok(vec![])
        }

        async fn read_exercise_history(
            &self,
            _name: &Name,
            _range: DateRange,
        ) -> Result<Vec<LoggedExercise>, ReadError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_get_overview_issues_fetches_concurrently() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let service = Service::new(InterleavingRepository {
            events: Rc::clone(&events),
        });
        service
            .get_overview("2024-01", 0, date("2024-01-03"), true, 10)
            .await
            .unwrap();
        assert_eq!(
            *events.borrow(),
            ["dates:start", "exercises:start", "exercises:end", "dates:end"]
        );
    }

    #[tokio::test]
    async fn test_get_overview_rejects_malformed_month() {
        let service = Service::new(FakeRepository::new(vec![]));
        let result = service
            .get_overview("2024-13", 0, date("2024-01-03"), true, 10)
            .await;
        assert!(matches!(result, Err(ReadError::Other(_))));
    }

    #[tokio::test]
    async fn test_get_agenda() {
        let service = Service::new(FakeRepository::new(vec![squat(1, "2024-01-01", 100.0)]));
        let agenda = service.get_agenda(date("2024-01-01"), false, 10).await.unwrap();
        assert_eq!(agenda.sections.len(), 1);
        assert_eq!(agenda.sections[0].exercises.len(), 1);
    }

    #[tokio::test]
    async fn test_get_charts() {
        // The 30-day window ending 2024-01-31 starts on 2024-01-02.
        let service = Service::new(FakeRepository::new(vec![
            squat(1, "2024-01-01", 95.0),
            squat(2, "2024-01-02", 100.0),
            squat(3, "2024-01-03", 102.5),
        ]));
        let name = Name::new("Squat").unwrap();
        let charts = service
            .get_charts(
                &[ExerciseSelection {
                    name: name.clone(),
                    color: "#3273dc".to_string(),
                }],
                ChartPeriod::_1M,
                date("2024-01-31"),
            )
            .await
            .unwrap();
        assert_eq!(
            charts.best_values[&name],
            [
                ChartDataPoint {
                    date: date("2024-01-02"),
                    value: 100.0,
                },
                ChartDataPoint {
                    date: date("2024-01-03"),
                    value: 102.5,
                },
            ]
        );
        assert_eq!(charts.histories[&name].len(), 2);
    }

    #[tokio::test]
    async fn test_get_exercise_summaries() {
        let service = Service::new(FakeRepository::new(vec![squat(1, "2024-01-01", 100.0)]));
        let summaries = service.get_exercise_summaries().await.unwrap();
        assert_eq!(
            summaries,
            [ExerciseSummary {
                name: Name::new("Squat").unwrap(),
                variant: ExerciseVariant::WeightReps,
            }]
        );
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let mut repository = FakeRepository::new(vec![]);
        repository.available = false;
        let service = Service::new(repository);
        assert!(matches!(
            service.get_agenda(date("2024-01-01"), true, 10).await,
            Err(ReadError::Storage(StorageError::Unavailable))
        ));
    }

    #[tokio::test]
    async fn test_preference_round_trip() {
        let service = Service::new(FakeRepository::new(vec![]));
        assert_eq!(service.get_preference("theme").await.unwrap(), None);
        service.set_preference("theme", json!("dark")).await.unwrap();
        assert_eq!(
            service.get_preference("theme").await.unwrap(),
            Some(json!("dark"))
        );
    }
}
