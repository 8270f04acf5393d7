// src/items/meal.rs
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::extractors::schema::{SchemaBuilder, TableRecord};
use crate::items::cells;

/// A row of the meal application board (`meal.php`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MealApplicationItem {
    pub id: i32,
    pub title: String,
    pub has_attachment: bool,
    pub author: String,
    pub views: u32,
    pub created_at: NaiveDateTime,
}

impl TableRecord for MealApplicationItem {
    const KIND: &'static str = "MealApplicationItem";
    const PATH: &'static str = "meal";

    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("id", 0, |r: &mut Self, v| r.id = v)
            .field("title", 1, |r: &mut Self, v| r.title = v)
            .field("has_attachment", 2, |r: &mut Self, v| r.has_attachment = v)
            .field("author", 3, |r: &mut Self, v| r.author = v)
            .field("views", 4, |r: &mut Self, v| r.views = v)
            .field("created_at", 5, |r: &mut Self, v| r.created_at = v)
            .extractor("get_id", cells::id_or_negative)
            .extractor("get_title", cells::anchor_title)
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
    use scraper::{Html, Selector};

    #[test]
    fn test_meal_rows() {
        let doc = Html::parse_document(
            r#"<table>
                <tr><th>번호</th><th>제목</th><th>첨부</th><th>작성자</th><th>조회</th><th>등록일</th></tr>
                <tr><td>88</td><td><a>4월 석식 신청</a></td><td><div>-</div></td><td>행정실</td><td>310</td><td>2024-03-28</td></tr>
            </table>"#,
        );
        let rows: Vec<_> = doc.select(&Selector::parse("tr").unwrap()).collect();
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<MealApplicationItem>().unwrap();

        let items = TableList::from_rows(&schema, rows).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 88);
        assert_eq!(items[0].title, "4월 석식 신청");
        assert!(!items[0].has_attachment);
        assert_eq!(items[0].author, "행정실");
        assert_eq!(items[0].views, 310);
        assert_eq!(items[0].created_at.to_string(), "2024-03-28 00:00:00");
        assert_eq!(schema.field_count(), 6);
    }
}
