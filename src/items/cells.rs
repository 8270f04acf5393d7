// src/items/cells.rs

//! Extractors shared by several board layouts. Each one documents what it
//! does with a cell it cannot read: lenient ones fall back to a default,
//! strict ones return an [`ExtractError`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use scraper::ElementRef;

use crate::extractors::markup::NodeExt;
use crate::utils::error::ExtractError;

pub const TITLE_NOT_FOUND: &str = "Title not found";

const LISTING_DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y.%m.%d %H:%M", "%Y/%m/%d %H:%M"];
const LISTING_DAY_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y.%m.%d."];

/// Timestamp given to listing dates that cannot be read.
pub fn min_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::default())
}

pub fn trimmed_text(cell: ElementRef<'_>) -> String {
    cell.inner_text().trim().to_string()
}

/// Lenient: `-1` when the cell is not an integer.
pub fn id_or_negative(cell: ElementRef<'_>) -> Result<i32, ExtractError> {
    Ok(trimmed_text(cell).parse().unwrap_or(-1))
}

/// Strict: the cell must hold an integer.
pub fn id_strict(cell: ElementRef<'_>) -> Result<i32, ExtractError> {
    let text = trimmed_text(cell);
    text.parse().map_err(|_| ExtractError::InvalidNumber(text))
}

/// Lenient: `0` when the cell is not a count.
pub fn count_or_zero(cell: ElementRef<'_>) -> Result<u32, ExtractError> {
    Ok(trimmed_text(cell).parse().unwrap_or(0))
}

/// Text of the first direct `<a>`, or [`TITLE_NOT_FOUND`].
pub fn anchor_title(cell: ElementRef<'_>) -> Result<String, ExtractError> {
    Ok(cell
        .child_by("a")
        .map(|a| a.inner_text().trim().to_string())
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string()))
}

/// True unless the direct `<div>` reads `-`. A cell without that div counts
/// as having an attachment.
pub fn attachment_flag(cell: ElementRef<'_>) -> Result<bool, ExtractError> {
    Ok(cell.child_by("div").map_or(true, |div| div.inner_text().trim() != "-"))
}

pub fn plain_text(cell: ElementRef<'_>) -> Result<String, ExtractError> {
    Ok(trimmed_text(cell))
}

/// Whether the cell has a direct `<span>` child.
pub fn has_span(cell: ElementRef<'_>) -> Result<bool, ExtractError> {
    Ok(cell.child_by("span").is_some())
}

/// Lenient: listing timestamps in the usual board formats, a date alone
/// meaning midnight; [`min_timestamp`] otherwise.
pub fn listing_timestamp(cell: ElementRef<'_>) -> Result<NaiveDateTime, ExtractError> {
    Ok(parse_listing_timestamp(&trimmed_text(cell)).unwrap_or_else(min_timestamp))
}

fn parse_listing_timestamp(text: &str) -> Option<NaiveDateTime> {
    LISTING_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            LISTING_DAY_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.and_time(NaiveTime::default()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn with_cell<R>(inner: &str, f: impl FnOnce(ElementRef<'_>) -> R) -> R {
        let doc = Html::parse_document(&format!("<table><tr><td>{}</td></tr></table>", inner));
        let selector = Selector::parse("td").unwrap();
        let cell = doc.select(&selector).next().unwrap();
        f(cell)
    }

    #[test]
    fn test_number_policies() {
        assert_eq!(with_cell(" 42 ", id_or_negative).unwrap(), 42);
        assert_eq!(with_cell("공지", id_or_negative).unwrap(), -1);
        assert_eq!(with_cell("abc", count_or_zero).unwrap(), 0);
        assert_eq!(with_cell("17", id_strict).unwrap(), 17);
        assert!(matches!(with_cell("공지", id_strict), Err(ExtractError::InvalidNumber(t)) if t == "공지"));
    }

    #[test]
    fn test_anchor_title_and_attachment() {
        assert_eq!(with_cell("<a href='#'> Notice </a>", anchor_title).unwrap(), "Notice");
        assert_eq!(with_cell("Notice", anchor_title).unwrap(), TITLE_NOT_FOUND);
        assert!(!with_cell("<div> - </div>", attachment_flag).unwrap());
        assert!(with_cell("<div><img src='file.png'>1</div>", attachment_flag).unwrap());
        assert!(with_cell("", attachment_flag).unwrap());
    }

    #[test]
    fn test_listing_timestamp_formats() {
        let at = |h, m, s| NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(h, m, s).unwrap();
        assert_eq!(with_cell("2024-03-05 08:30:15", listing_timestamp).unwrap(), at(8, 30, 15));
        assert_eq!(with_cell("2024.03.05 08:30", listing_timestamp).unwrap(), at(8, 30, 0));
        assert_eq!(with_cell("2024-03-05", listing_timestamp).unwrap(), at(0, 0, 0));
        assert_eq!(with_cell("yesterday", listing_timestamp).unwrap(), min_timestamp());
    }
}
