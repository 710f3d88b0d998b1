use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::{
    calendar::{self, DateRange},
    exercise::LoggedExercise,
};

/// One agenda entry. An empty `exercises` list denotes a rest day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySection {
    pub date: NaiveDate,
    pub title: String,
    pub exercises: Vec<LoggedExercise>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Agenda {
    pub sections: Vec<DaySection>,
    pub has_more_data: bool,
}

/// Presence flag for every date of the range, for calendar-overview
/// highlighting.
#[must_use]
pub fn calendar_marks(
    logged_dates: &BTreeSet<NaiveDate>,
    range: DateRange,
) -> BTreeMap<NaiveDate, bool> {
    range
        .dates()
        .map(|date| (date, logged_dates.contains(&date)))
        .collect()
}

/// Group logged exercises into date-descending agenda sections.
///
/// With `show_rest_days` the candidate sequence is gap-filled from
/// `max(today, most recent logged date)` down to the oldest logged date
/// inclusive; without it only dates with logged data qualify. The first
/// `days_to_show` candidates become sections and `has_more_data` reports
/// whether the candidate sequence was longer.
#[must_use]
pub fn build_agenda(
    exercises: &[LoggedExercise],
    today: NaiveDate,
    show_rest_days: bool,
    days_to_show: usize,
) -> Agenda {
    let mut by_date: BTreeMap<NaiveDate, Vec<LoggedExercise>> = BTreeMap::new();
    for exercise in exercises {
        by_date
            .entry(exercise.date)
            .or_default()
            .push(exercise.clone());
    }

    let candidates: Vec<NaiveDate> = if show_rest_days {
        let Some(oldest) = by_date.keys().next().copied() else {
            return Agenda::default();
        };
        let newest = by_date.keys().next_back().copied().unwrap_or(oldest);
        let mut dates = oldest
            .iter_days()
            .take_while(|date| *date <= newest.max(today))
            .collect::<Vec<_>>();
        dates.reverse();
        dates
    } else {
        by_date.keys().rev().copied().collect()
    };

    let has_more_data = candidates.len() > days_to_show;
    let sections = candidates
        .into_iter()
        .take(days_to_show)
        .map(|date| DaySection {
            date,
            title: calendar::format_display_date(date),
            exercises: by_date.remove(&date).unwrap_or_default(),
        })
        .collect();

    Agenda {
        sections,
        has_more_data,
    }
}
