// src/extractors/calendar.rs

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::extractors::markup::NodeExt;
use crate::extractors::row::CELL_TAG;
use crate::utils::error::ExtractError;

const DATE_ATTR: &str = "data-date";
const DATE_FORMAT: &str = "%Y-%m-%d";
const OUT_OF_RANGE_CLASS: &str = "not";
const DAY_MARKER: &str = "div.day";
const HOLIDAY_CLASS: &str = "date_holiday";
const EVENT_CONTAINER_TAG: &str = "div";
// Matched against the whole class attribute; `class="sel_box open"` is not a container.
const EVENT_CONTAINER_CLASS: &str = "sel_box";
const EVENT_ENTRY: &str = "div";
const EVENT_LABEL: &str = "span";

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));
static DATED_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td[data-date]").expect("Failed to compile DATED_CELL_SELECTOR"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

/// Date given to cells whose `data-date` is missing or unreadable.
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// One emitted calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRecord {
    date: NaiveDate,
    events: Vec<String>,
    is_holiday: bool,
}

impl DayRecord {
    /// Weekends are holidays whatever `marked_holiday` says.
    pub fn new(date: NaiveDate, events: Vec<String>, marked_holiday: bool) -> Self {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        Self { date, events, is_holiday: weekend || marked_holiday }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn is_holiday(&self) -> bool {
        self.is_holiday
    }
}

/// Walks a calendar grid, header row first, and emits one record per
/// populated day cell in row-major order.
///
/// Cells are dropped when marked out of range (`td.not`), when they have no
/// `div.day` marker, or when they have no `<div class="sel_box">` event
/// container.
pub fn extract_calendar<'a, I>(rows: I) -> Vec<DayRecord>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    let mut days = Vec::new();

    for row in rows.into_iter().skip(1) {
        for cell in row.children_by(CELL_TAG) {
            if cell.has_class(OUT_OF_RANGE_CLASS) {
                continue;
            }
            if let Some(day) = extract_day(cell) {
                days.push(day);
            }
        }
    }

    days
}

fn event_container(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.children_by(EVENT_CONTAINER_TAG)
        .into_iter()
        .find(|div| div.attribute("class") == Some(EVENT_CONTAINER_CLASS))
}

fn extract_day(cell: ElementRef<'_>) -> Option<DayRecord> {
    let date = cell
        .attribute(DATE_ATTR)
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok())
        .unwrap_or_else(sentinel_date);

    let Some(marker) = cell.child_by(DAY_MARKER) else {
        tracing::trace!("Skipping calendar cell without day marker ({})", date);
        return None;
    };
    let marked_holiday = marker.has_class(HOLIDAY_CLASS);

    let Some(container) = event_container(cell) else {
        tracing::trace!("Skipping calendar cell without event container ({})", date);
        return None;
    };

    let events = container
        .children_by(EVENT_ENTRY)
        .into_iter()
        .map(|entry| {
            entry
                .child_by(EVENT_LABEL)
                .map(|label| label.inner_text().trim().to_string())
                .unwrap_or_default()
        })
        .collect();

    Some(DayRecord::new(date, events, marked_holiday))
}

/// Finds the calendar table in a full page (the first table holding dated
/// cells) and extracts it.
pub fn calendar_from_html(html: &str) -> Result<Calendar, ExtractError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&TABLE_SELECTOR)
        .find(|table| table.select(&DATED_CELL_SELECTOR).next().is_some())
        .ok_or_else(|| ExtractError::TableNotFound("no table with dated calendar cells".to_string()))?;

    let calendar = Calendar::from(extract_calendar(table.select(&ROW_SELECTOR)));
    tracing::debug!("Extracted {} calendar days", calendar.len());
    Ok(calendar)
}

/// Extracted days with 1-based lookup, as the board's calendar shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Calendar {
    days: Vec<DayRecord>,
}

impl From<Vec<DayRecord>> for Calendar {
    fn from(days: Vec<DayRecord>) -> Self {
        Self { days }
    }
}

impl Calendar {
    /// The `n`th emitted day, counting from 1.
    pub fn day(&self, n: usize) -> Option<&DayRecord> {
        n.checked_sub(1).and_then(|i| self.days.get(i))
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn into_days(self) -> Vec<DayRecord> {
        self.days
    }
}
