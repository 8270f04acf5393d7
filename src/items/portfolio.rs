// src/items/portfolio.rs
use chrono::{Datelike, Local, NaiveDateTime};
use scraper::{node::Node, ElementRef};
use serde::Serialize;

use crate::extractors::markup::NodeExt;
use crate::extractors::schema::{SchemaBuilder, TableRecord};
use crate::items::cells;
use crate::utils::error::ExtractError;

// Portfolio windows are printed without a year, e.g. "03-04 09:00:00".
const WINDOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PortfolioType {
    #[default]
    None,
    Waiting,
    InProgress,
    Completed,
    Vote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    First,
    Second,
    Third,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortfolioSubject {
    Autonomy,
    Volunteer,
    ClubActivity,
    Career,
    Read,
    Korean,
    English,
    Math,
    Social,
    Science,
    Entertainment,
    Etc,
}

/// The parts packed into a portfolio title such as
/// `2024년 1학년 국어 - 독서 감상문`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioTitle {
    pub year: i32,
    pub grade: Grade,
    pub subject: PortfolioSubject,
    pub title: String,
}

impl PortfolioTitle {
    pub fn parse(raw: &str) -> Result<Self, ExtractError> {
        let invalid = |why: &str| ExtractError::InvalidTitle(format!("{} in '{}'", why, raw));

        let (head, title) = raw.split_once('-').ok_or_else(|| invalid("missing '-' separator"))?;
        let mut parts = head.split_whitespace();
        let (Some(year), Some(grade), Some(subject)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid("expected year, grade and subject"));
        };

        let year = year
            .trim_end_matches('년')
            .parse::<i32>()
            .map_err(|_| invalid("unreadable year"))?;
        let grade = match grade {
            "1학년" => Grade::First,
            "2학년" => Grade::Second,
            "3학년" => Grade::Third,
            "전학년" => Grade::All,
            _ => return Err(invalid("unknown grade")),
        };
        let subject = match subject {
            "자율" => PortfolioSubject::Autonomy,
            "봉사" => PortfolioSubject::Volunteer,
            "동아리" => PortfolioSubject::ClubActivity,
            "진로" => PortfolioSubject::Career,
            "독서" => PortfolioSubject::Read,
            "국어" => PortfolioSubject::Korean,
            "영어" => PortfolioSubject::English,
            "수학" => PortfolioSubject::Math,
            "사회" => PortfolioSubject::Social,
            "과학" => PortfolioSubject::Science,
            "예체" => PortfolioSubject::Entertainment,
            "기타" => PortfolioSubject::Etc,
            _ => return Err(invalid("unknown subject")),
        };

        Ok(Self { year, grade, subject, title: title.trim().to_string() })
    }
}

/// A row of the portfolio / activity boards (`portfolio.php`).
///
/// Unlike the notice boards this layout is read strictly: an unreadable id,
/// submission count or submission window fails the row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioItem {
    pub id: i32,
    pub kind: PortfolioType,
    pub raw_title: String,
    pub submitted: bool,
    pub submit_count: u32,
    pub teacher: String,
    pub has_attachments: bool,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
}

impl PortfolioItem {
    /// Splits `raw_title`; fails on titles that do not follow the board's
    /// `<year>년 <grade> <subject> - <title>` convention.
    pub fn title_parts(&self) -> Result<PortfolioTitle, ExtractError> {
        if self.raw_title.is_empty() {
            return Err(ExtractError::InvalidTitle("title is empty".to_string()));
        }
        PortfolioTitle::parse(&self.raw_title)
    }
}

fn get_item_type(cell: ElementRef<'_>) -> Result<PortfolioType, ExtractError> {
    let label = cell.child_by("div").map(|div| div.inner_text().trim().to_string());
    Ok(match label.as_deref() {
        Some("대기") => PortfolioType::Waiting,
        Some("제출") => PortfolioType::InProgress,
        Some("마감") => PortfolioType::Completed,
        Some("투표") => PortfolioType::Vote,
        _ => PortfolioType::None,
    })
}

/// The second direct `<a>` holds the title; the first is the category link.
fn get_raw_title(cell: ElementRef<'_>) -> Result<String, ExtractError> {
    Ok(cell
        .children_by("a")
        .get(1)
        .map(|a| a.inner_text().trim().to_string())
        .unwrap_or_else(|| cells::TITLE_NOT_FOUND.to_string()))
}

/// Strict: `<p>12명</p>`; no `<p>` means nobody has submitted.
fn get_submit_count(cell: ElementRef<'_>) -> Result<u32, ExtractError> {
    let Some(p) = cell.child_by("p") else {
        return Ok(0);
    };
    let text = p.inner_text();
    let count = text.trim().trim_end_matches('명').trim();
    count.parse().map_err(|_| ExtractError::InvalidNumber(text.trim().to_string()))
}

fn get_start_date(cell: ElementRef<'_>) -> Result<NaiveDateTime, ExtractError> {
    submission_window(cell).map(|(start, _)| start)
}

fn get_end_date(cell: ElementRef<'_>) -> Result<NaiveDateTime, ExtractError> {
    submission_window(cell).map(|(_, end)| end)
}

/// Strict: the cell holds exactly two `MM-dd HH:mm:ss` stamps separated by
/// `<br>`, both taken to be in the current year.
fn submission_window(cell: ElementRef<'_>) -> Result<(NaiveDateTime, NaiveDateTime), ExtractError> {
    let mut flat = String::new();
    for node in cell.children() {
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "br" {
                flat.push('\n');
            } else {
                flat.push_str(el.inner_text().trim());
            }
        } else if let Node::Text(text) = node.value() {
            flat.push_str(text.trim());
        }
    }

    let stamps: Vec<&str> = flat.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let [start, end] = stamps.as_slice() else {
        return Err(ExtractError::UnexpectedShape(format!(
            "expected two date strings, but found {}",
            stamps.len()
        )));
    };

    let year = Local::now().year();
    Ok((parse_window_stamp(start, year)?, parse_window_stamp(end, year)?))
}

fn parse_window_stamp(stamp: &str, year: i32) -> Result<NaiveDateTime, ExtractError> {
    NaiveDateTime::parse_from_str(&format!("{}-{}", year, stamp), WINDOW_FORMAT)
        .map_err(|_| ExtractError::InvalidDate(stamp.to_string()))
}

impl TableRecord for PortfolioItem {
    const KIND: &'static str = "PortfolioItem";
    const PATH: &'static str = "portfolio";

    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("id", 0, |r: &mut Self, v| r.id = v)
            .field_via("kind", 1, "get_item_type", |r: &mut Self, v| r.kind = v)
            .field("raw_title", 2, |r: &mut Self, v| r.raw_title = v)
            .field("submitted", 3, |r: &mut Self, v| r.submitted = v)
            .field("submit_count", 4, |r: &mut Self, v| r.submit_count = v)
            .field("teacher", 5, |r: &mut Self, v| r.teacher = v)
            .field("has_attachments", 6, |r: &mut Self, v| r.has_attachments = v)
            .field("start_date", 7, |r: &mut Self, v| r.start_date = v)
            .field("end_date", 7, |r: &mut Self, v| r.end_date = v)
            .extractor("get_id", cells::id_strict)
            .extractor("get_item_type", get_item_type)
            .extractor("get_raw_title", get_raw_title)
            .extractor("get_submitted", cells::has_span)
            .extractor("get_submit_count", get_submit_count)
            .extractor("get_teacher", cells::plain_text)
            .extractor("get_has_attachments", cells::has_span)
            .extractor("get_start_date", get_start_date)
            .extractor("get_end_date", get_end_date);
    }
}
