#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod agenda;
pub mod calendar;
pub mod chart;
pub mod comparison;
mod error;
pub mod exercise;
pub mod service;
pub mod units;

pub use agenda::{Agenda, DaySection};
pub use calendar::{DateError, DateRange};
pub use chart::{ChartDataPoint, ChartPeriod, ExerciseCharts, ExerciseSelection};
pub use comparison::{ComparisonRule, Criterion, Direction, Metric};
pub use error::{ReadError, StorageError, WriteError};
pub use exercise::{
    Distance, DistanceError, ExerciseID, ExerciseSummary, ExerciseVariant, ExerciseVariantError,
    FieldSet, LoggedExercise, LoggedExerciseID, Name, NameError, Reps, RepsError, SetID, SetRecord,
    Time, TimeError, Weight, WeightError,
};
pub use service::{
    Overview, PreferenceRepository, PreferenceService, Service, TrainingLogRepository,
    TrainingLogService,
};
pub use units::{DistanceUnit, WeightUnit};
