use std::cell::{Cell, RefCell};

use chrono::NaiveDate;
use futures_util::join;
use gymlog_domain::{
    ChartPeriod, DistanceUnit, ExerciseCharts, ExerciseSelection, Overview, PreferenceService,
    ReadError, TrainingLogService, WeightUnit, calendar,
};
use log::{debug, error};

use crate::settings::{self, Settings, Theme, ViewMode, keys};

pub const DEFAULT_DAYS_TO_SHOW: usize = 14;
const CALENDAR_BUFFER_MONTHS: u32 = 1;

/// Aggregated dashboard data from one consistent refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub overview: Overview,
    pub charts: ExerciseCharts,
}

/// Dashboard state: current settings plus the latest committed snapshot.
///
/// Refreshes may overlap when settings change in quick succession. Every
/// refresh takes a token; a snapshot is committed only if no newer refresh
/// has started in the meantime, so a slow earlier refresh can never overwrite
/// the result of a later one.
pub struct Dashboard<S> {
    service: S,
    settings: RefCell<Settings>,
    snapshot: RefCell<Snapshot>,
    month: RefCell<String>,
    days_to_show: Cell<usize>,
    refresh_token: Cell<u64>,
}

impl<S: TrainingLogService + PreferenceService> Dashboard<S> {
    pub fn new(service: S, today: NaiveDate) -> Self {
        Self {
            service,
            settings: RefCell::new(Settings::default()),
            snapshot: RefCell::new(Snapshot::default()),
            month: RefCell::new(today.format("%Y-%m").to_string()),
            days_to_show: Cell::new(DEFAULT_DAYS_TO_SHOW),
            refresh_token: Cell::new(0),
        }
    }

    /// Load persisted settings and build the initial snapshot.
    pub async fn init(&self, today: NaiveDate) -> Result<(), ReadError> {
        let loaded = Settings::load(&self.service).await?;
        *self.settings.borrow_mut() = loaded;
        self.refresh(today).await
    }

    pub async fn refresh(&self, today: NaiveDate) -> Result<(), ReadError> {
        let token = self.refresh_token.get().wrapping_add(1);
        self.refresh_token.set(token);

        let month = self.month.borrow().clone();
        let (show_rest_days, period, selection) = {
            let settings = self.settings.borrow();
            (
                settings.show_rest_days,
                settings.chart_period,
                settings.chart_selection.clone(),
            )
        };
        let (overview, charts) = join!(
            self.service.get_overview(
                &month,
                CALENDAR_BUFFER_MONTHS,
                today,
                show_rest_days,
                self.days_to_show.get(),
            ),
            self.service.get_charts(&selection, period, today),
        );
        let snapshot = match (overview, charts) {
            (Ok(overview), Ok(charts)) => Snapshot { overview, charts },
            (Err(err), _) | (_, Err(err)) => {
                error!("dashboard refresh failed, keeping previous snapshot: {err}");
                return Err(err);
            }
        };

        if self.refresh_token.get() == token {
            *self.snapshot.borrow_mut() = snapshot;
        } else {
            debug!("discarding superseded dashboard snapshot");
        }
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn month(&self) -> String {
        self.month.borrow().clone()
    }

    #[must_use]
    pub fn days_to_show(&self) -> usize {
        self.days_to_show.get()
    }

    /// Switch the calendar overview to another `YYYY-MM` month.
    pub async fn set_month(&self, month: &str, today: NaiveDate) -> Result<(), ReadError> {
        calendar::calendar_date_range(month, CALENDAR_BUFFER_MONTHS)
            .map_err(|err| ReadError::Other(err.into()))?;
        *self.month.borrow_mut() = month.to_string();
        self.refresh(today).await
    }

    /// Extend the agenda by another page of days.
    pub async fn show_more(&self, today: NaiveDate) {
        self.days_to_show
            .set(self.days_to_show.get() + DEFAULT_DAYS_TO_SHOW);
        let _ = self.refresh(today).await;
    }

    // Settings writes are optimistic: the in-memory value changes first and
    // persistence failures are logged without being propagated or rolled
    // back. Settings that feed the aggregation also trigger a refresh.

    pub async fn set_weight_unit(&self, value: WeightUnit) {
        self.settings.borrow_mut().weight_unit = value;
        settings::store(&self.service, keys::WEIGHT_UNIT, &value).await;
    }

    pub async fn set_distance_unit(&self, value: DistanceUnit) {
        self.settings.borrow_mut().distance_unit = value;
        settings::store(&self.service, keys::DISTANCE_UNIT, &value).await;
    }

    pub async fn set_weight_increment(&self, value: f32) {
        self.settings.borrow_mut().weight_increment = value;
        settings::store(&self.service, keys::WEIGHT_INCREMENT, &value).await;
    }

    pub async fn set_theme(&self, value: Theme) {
        self.settings.borrow_mut().theme = value;
        settings::store(&self.service, keys::THEME, &value).await;
    }

    pub async fn set_view_mode(&self, value: ViewMode) {
        self.settings.borrow_mut().view_mode = value;
        settings::store(&self.service, keys::VIEW_MODE, &value).await;
    }

    pub async fn set_show_only_used_exercises(&self, value: bool) {
        self.settings.borrow_mut().show_only_used_exercises = value;
        settings::store(&self.service, keys::SHOW_ONLY_USED_EXERCISES, &value).await;
    }

    pub async fn set_show_rest_days(&self, value: bool, today: NaiveDate) {
        self.settings.borrow_mut().show_rest_days = value;
        settings::store(&self.service, keys::SHOW_REST_DAYS, &value).await;
        let _ = self.refresh(today).await;
    }

    pub async fn set_chart_period(&self, value: ChartPeriod, today: NaiveDate) {
        self.settings.borrow_mut().chart_period = value;
        settings::store(&self.service, keys::CHART_PERIOD, &value).await;
        let _ = self.refresh(today).await;
    }

    pub async fn set_chart_selection(&self, value: Vec<ExerciseSelection>, today: NaiveDate) {
        self.settings.borrow_mut().chart_selection = value.clone();
        settings::store(&self.service, keys::CHART_SELECTION, &value).await;
        let _ = self.refresh(today).await;
    }
}
