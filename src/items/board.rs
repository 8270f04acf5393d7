// src/items/board.rs
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use serde::Serialize;

use crate::extractors::markup::NodeExt;
use crate::extractors::schema::{SchemaBuilder, TableRecord};
use crate::items::cells;
use crate::utils::error::ExtractError;

// "[cast]" or "[cast/total]", e.g. "Field trip survey [3/10]"
static VOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\s*(\d+)\s*(?:/\s*(\d+)\s*)?\]").expect("Failed to compile VOTE_RE"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BoardType {
    #[default]
    None,
    Announcement,
    Waiting,
    InProgress,
    Completed,
}

impl BoardType {
    pub fn from_label(label: &str) -> Self {
        match label {
            "대기" => Self::Waiting,
            "제출" => Self::InProgress,
            "마감" => Self::Completed,
            "알림" => Self::Announcement,
            _ => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BoardTarget {
    #[default]
    All,
    Student,
}

/// Tally embedded in a survey title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteAnnotation {
    pub cast: u32,
    pub total: Option<u32>,
}

impl VoteAnnotation {
    /// First bracketed `cast[/total]` group in `text`, if any. Numbers too
    /// large to count are treated as no annotation.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = VOTE_RE.captures(text)?;
        let cast = caps.get(1)?.as_str().parse().ok()?;
        let total = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        Some(Self { cast, total })
    }
}

/// A row of the notice/survey boards (`board_msg.php`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardItem {
    pub id: i32,
    pub kind: BoardType,
    pub target: BoardTarget,
    pub title: String,
    pub has_vote: bool,
    pub vote: Option<VoteAnnotation>,
    pub has_attachment: bool,
    pub author: String,
    pub views: u32,
    pub created_at: NaiveDateTime,
}

fn get_item_type(cell: ElementRef<'_>) -> Result<BoardType, ExtractError> {
    Ok(cell
        .child_by("div")
        .map_or(BoardType::None, |div| BoardType::from_label(div.inner_text().trim())))
}

fn get_target(cell: ElementRef<'_>) -> Result<BoardTarget, ExtractError> {
    Ok(match cells::trimmed_text(cell).as_str() {
        "학생" => BoardTarget::Student,
        _ => BoardTarget::All,
    })
}

fn get_vote(cell: ElementRef<'_>) -> Result<Option<VoteAnnotation>, ExtractError> {
    Ok(VoteAnnotation::parse(&cell.inner_text()))
}

fn get_has_vote(cell: ElementRef<'_>) -> Result<bool, ExtractError> {
    Ok(VoteAnnotation::parse(&cell.inner_text()).is_some())
}

impl TableRecord for BoardItem {
    const KIND: &'static str = "BoardItem";
    const PATH: &'static str = "board_msg";

    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("id", 0, |r: &mut Self, v| r.id = v)
            .field_via("kind", 1, "get_item_type", |r: &mut Self, v| r.kind = v)
            .field("target", 2, |r: &mut Self, v| r.target = v)
            .field("title", 3, |r: &mut Self, v| r.title = v)
            .field("has_vote", 3, |r: &mut Self, v| r.has_vote = v)
            .field("vote", 3, |r: &mut Self, v| r.vote = v)
            .field("has_attachment", 4, |r: &mut Self, v| r.has_attachment = v)
            .field("author", 5, |r: &mut Self, v| r.author = v)
            .field("views", 6, |r: &mut Self, v| r.views = v)
            .field("created_at", 7, |r: &mut Self, v| r.created_at = v)
            .extractor("get_id", cells::id_or_negative)
            .extractor("get_item_type", get_item_type)
            .extractor("get_target", get_target)
            .extractor("get_title", cells::anchor_title)
            .extractor("get_has_vote", get_has_vote)
            .extractor("get_vote", get_vote)
            .extractor("get_has_attachment", cells::attachment_flag)
            .extractor("get_author", cells::plain_text)
            .extractor("get_views", cells::count_or_zero)
            .extractor("get_created_at", cells::listing_timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::registry::SchemaRegistry;
    use crate::extractors::table::TableList;
    use chrono::NaiveDate;
    use scraper::{Html, Selector};

    const BOARD: &str = r#"
        <table>
          <tr><th>번호</th><th>구분</th><th>대상</th><th>제목</th><th>첨부</th><th>작성자</th><th>조회</th><th>등록일</th></tr>
          <tr>
            <td>1203</td><td><div>알림</div></td><td>전체</td>
            <td><a href="?no=1203">Field trip survey [3/10]</a></td>
            <td><div>-</div></td><td> Kim </td><td>57</td><td>2024-03-05 08:30:00</td>
          </tr>
          <tr>
            <td>공지</td><td><div>마감</div></td><td>학생</td>
            <td><a href="?no=1">Uniform vote</a> [5]</td>
            <td><div><img src="clip.png"></div></td><td>Lee</td><td>n/a</td><td>someday</td>
          </tr>
          <tr>
            <td>1201</td><td><div>?</div></td><td>전체</td><td><a href="?no=1201">Menu</a></td>
          </tr>
        </table>"#;

    fn board() -> TableList<BoardItem> {
        let doc = Html::parse_document(BOARD);
        let rows: Vec<_> = doc.select(&Selector::parse("tr").unwrap()).collect();
        let schema = SchemaRegistry::new().resolve::<BoardItem>().unwrap();
        TableList::from_rows(&schema, rows).unwrap()
    }

    #[test]
    fn test_vote_annotation_patterns() {
        assert_eq!(VoteAnnotation::parse("Event [3/10]"), Some(VoteAnnotation { cast: 3, total: Some(10) }));
        assert_eq!(VoteAnnotation::parse("Event [5]"), Some(VoteAnnotation { cast: 5, total: None }));
        assert_eq!(VoteAnnotation::parse("Event [ 4 / 9 ]"), Some(VoteAnnotation { cast: 4, total: Some(9) }));
        assert_eq!(VoteAnnotation::parse("Event"), None);
        assert_eq!(VoteAnnotation::parse("Event [draft]"), None);
        assert_eq!(VoteAnnotation::parse("Event [99999999999]"), None);
    }

    #[test]
    fn test_board_rows() {
        let items = board();
        assert_eq!(items.len(), 3);

        let first = &items[0];
        assert_eq!(first.id, 1203);
        assert_eq!(first.kind, BoardType::Announcement);
        assert_eq!(first.target, BoardTarget::All);
        assert_eq!(first.title, "Field trip survey [3/10]");
        assert!(first.has_vote);
        assert_eq!(first.vote, Some(VoteAnnotation { cast: 3, total: Some(10) }));
        assert!(!first.has_attachment);
        assert_eq!(first.author, "Kim");
        assert_eq!(first.views, 57);
        assert_eq!(
            first.created_at,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(8, 30, 0).unwrap()
        );

        // Lenient fields fall back instead of failing the row.
        let second = &items[1];
        assert_eq!(second.id, -1);
        assert_eq!(second.kind, BoardType::Completed);
        assert_eq!(second.target, BoardTarget::Student);
        assert_eq!(second.title, "Uniform vote");
        assert_eq!(second.vote, Some(VoteAnnotation { cast: 5, total: None }));
        assert!(second.has_attachment);
        assert_eq!(second.views, 0);
        assert_eq!(second.created_at, cells::min_timestamp());
    }

    #[test]
    fn test_short_row_keeps_defaults() {
        let items = board();
        let third = &items[2];
        assert_eq!(third.id, 1201);
        assert_eq!(third.kind, BoardType::None);
        assert!(!third.has_vote);
        assert_eq!(third.vote, None);
        assert!(!third.has_attachment);
        assert_eq!(third.author, "");
        assert_eq!(third.created_at, NaiveDateTime::default());
    }
}
