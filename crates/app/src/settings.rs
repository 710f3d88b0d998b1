use gymlog_domain::{
    ChartPeriod, DistanceUnit, ExerciseSelection, PreferenceService, ReadError, WeightUnit,
};
use log::warn;
use serde::de::DeserializeOwned;

/// Preference keys. Each setting is persisted as an individual JSON value so
/// that a single malformed entry never invalidates the others.
pub mod keys {
    pub const WEIGHT_UNIT: &str = "weight_unit";
    pub const DISTANCE_UNIT: &str = "distance_unit";
    pub const WEIGHT_INCREMENT: &str = "weight_increment";
    pub const THEME: &str = "theme";
    pub const VIEW_MODE: &str = "view_mode";
    pub const SHOW_REST_DAYS: &str = "show_rest_days";
    pub const CHART_PERIOD: &str = "chart_period";
    pub const CHART_SELECTION: &str = "chart_selection";
    pub const SHOW_ONLY_USED_EXERCISES: &str = "show_only_used_exercises";
}

const DEFAULT_WEIGHT_INCREMENT: f32 = 2.5;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    pub weight_unit: WeightUnit,
    pub distance_unit: DistanceUnit,
    pub weight_increment: f32,
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub show_rest_days: bool,
    pub chart_period: ChartPeriod,
    pub chart_selection: Vec<ExerciseSelection>,
    pub show_only_used_exercises: bool,
}

impl Settings {
    /// Assemble settings from the individual preference entries. Missing or
    /// malformed entries fall back to their defaults; only a failing
    /// preference store aborts the load.
    pub async fn load(service: &impl PreferenceService) -> Result<Self, ReadError> {
        let defaults = Self::default();
        let mut settings = Self {
            weight_unit: read_key(service, keys::WEIGHT_UNIT, defaults.weight_unit).await?,
            distance_unit: read_key(service, keys::DISTANCE_UNIT, defaults.distance_unit).await?,
            weight_increment: read_key(
                service,
                keys::WEIGHT_INCREMENT,
                defaults.weight_increment,
            )
            .await?,
            theme: read_key(service, keys::THEME, defaults.theme).await?,
            view_mode: read_key(service, keys::VIEW_MODE, defaults.view_mode).await?,
            show_rest_days: read_key(service, keys::SHOW_REST_DAYS, defaults.show_rest_days)
                .await?,
            chart_period: read_key(service, keys::CHART_PERIOD, defaults.chart_period).await?,
            chart_selection: read_key(
                service,
                keys::CHART_SELECTION,
                defaults.chart_selection.clone(),
            )
            .await?,
            show_only_used_exercises: read_key(
                service,
                keys::SHOW_ONLY_USED_EXERCISES,
                defaults.show_only_used_exercises,
            )
            .await?,
        };
        if !settings.weight_increment.is_finite() || settings.weight_increment <= 0.0 {
            warn!(
                "ignoring non-positive weight increment {}",
                settings.weight_increment
            );
            settings.weight_increment = defaults.weight_increment;
        }
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::Kg,
            distance_unit: DistanceUnit::Km,
            weight_increment: DEFAULT_WEIGHT_INCREMENT,
            theme: Theme::Light,
            view_mode: ViewMode::Agenda,
            show_rest_days: true,
            chart_period: ChartPeriod::default(),
            chart_selection: vec![],
            show_only_used_exercises: true,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    System,
    Light,
    Dark,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Calendar,
    Agenda,
}

async fn read_key<T: DeserializeOwned>(
    service: &impl PreferenceService,
    key: &str,
    default: T,
) -> Result<T, ReadError> {
    match service.get_preference(key).await? {
        Some(value) => Ok(serde_json::from_value(value).unwrap_or_else(|err| {
            warn!("ignoring malformed preference {key}: {err}");
            default
        })),
        None => Ok(default),
    }
}

/// Persist a single setting. Serialization problems are logged and swallowed;
/// storage failures are already logged by the service.
pub async fn store(service: &impl PreferenceService, key: &str, value: &impl serde::Serialize) {
    match serde_json::to_value(value) {
        Ok(value) => {
            let _ = service.set_preference(key, value).await;
        }
        Err(err) => warn!("failed to serialize preference {key}: {err}"),
    }
}
