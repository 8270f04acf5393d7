// src/extractors/table.rs

use std::ops::Index;

use scraper::ElementRef;
use serde::Serialize;

use crate::extractors::row::extract_row;
use crate::extractors::schema::{ResolvedSchema, TableRecord};
use crate::utils::error::ExtractError;

/// Records of one type, accumulated page by page.
///
/// Appending never discards what is already held. If a row fails, the rows of
/// the same batch extracted before it stay in the list and the rest of the
/// batch is not processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableList<T> {
    items: Vec<T>,
}

impl<T> Default for TableList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: TableRecord> TableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from a whole table, skipping its header row.
    pub fn from_rows<'a, I>(schema: &ResolvedSchema<T>, rows: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let mut list = Self::new();
        list.append(schema, rows.into_iter().skip(1))?;
        Ok(list)
    }

    /// Extracts every row in order and adds it to the tail.
    pub fn append<'a, I>(&mut self, schema: &ResolvedSchema<T>, rows: I) -> Result<(), ExtractError>
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let before = self.items.len();
        for row in rows {
            let record = extract_row(schema, row)?;
            self.items.push(record);
        }
        tracing::debug!(
            "Appended {} {} records (total {})",
            self.items.len() - before,
            schema.record(),
            self.items.len()
        );
        Ok(())
    }
}

impl<T> TableList<T> {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Index<usize> for TableList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IntoIterator for TableList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'l, T> IntoIterator for &'l TableList<T> {
    type Item = &'l T;
    type IntoIter = std::slice::Iter<'l, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::registry::SchemaRegistry;
    use crate::extractors::row::tests::{table, table_rows, Score};
    use crate::extractors::schema::SchemaBuilder;
    use crate::extractors::markup::NodeExt;
    use scraper::Html;

    fn page(start: usize, len: usize) -> Html {
        let cells: Vec<[String; 2]> = (start..start + len).map(|i| [i.to_string(), format!("row {}", i)]).collect();
        let refs: Vec<[&str; 2]> = cells.iter().map(|[a, b]| [a.as_str(), b.as_str()]).collect();
        table(&refs)
    }

    #[test]
    fn test_two_pages_merge_in_order() {
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Score>().unwrap();
        let first = page(0, 20);
        let second = page(20, 5);

        let mut list = TableList::new();
        list.append(&schema, table_rows(&first)).unwrap();
        assert_eq!(list.count(), 20);
        list.append(&schema, table_rows(&second)).unwrap();

        assert_eq!(list.count(), 25);
        let numbers: Vec<i64> = list.iter().map(|s| s.number).collect();
        assert_eq!(numbers, (0..25).collect::<Vec<i64>>());
        assert_eq!(registry.resolution_count(), 1);
    }

    #[test]
    fn test_batched_appends_equal_one_concatenated_append() {
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Score>().unwrap();
        let batches = [page(0, 3), page(3, 0), page(3, 4), page(7, 1)];
        let whole = page(0, 8);

        let mut batched = TableList::new();
        for batch in &batches {
            batched.append(&schema, table_rows(batch)).unwrap();
        }
        let mut single = TableList::new();
        single.append(&schema, table_rows(&whole)).unwrap();

        assert_eq!(batched, single);
    }

    #[test]
    fn test_empty_batch_is_a_noop() {
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Score>().unwrap();
        let mut list = TableList::<Score>::new();
        list.append(&schema, Vec::new()).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_from_rows_skips_header() {
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Score>().unwrap();
        let doc = table(&[["No.", "Title"], ["1", "a"], ["2", "b"]]);

        let list = TableList::from_rows(&schema, table_rows(&doc)).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], Score { number: 1, text: "a".to_string() });
        assert_eq!(list.as_slice()[1].text, "b");

        let owned = list.into_vec();
        assert_eq!(owned.iter().map(|s| s.number).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        value: u32,
    }

    fn get_value(cell: ElementRef<'_>) -> Result<u32, ExtractError> {
        let raw = cell.inner_text();
        raw.trim().parse().map_err(|_| ExtractError::InvalidNumber(raw))
    }

    impl TableRecord for Counter {
        const KIND: &'static str = "Counter";
        const PATH: &'static str = "counter";

        fn declare(schema: &mut SchemaBuilder<Self>) {
            schema.field("value", 0, |r: &mut Self, v| r.value = v).extractor("get_value", get_value);
        }
    }

    #[test]
    fn test_failure_keeps_earlier_pages_and_rows() {
        let registry = SchemaRegistry::new();
        let schema = registry.resolve::<Counter>().unwrap();
        let first = table(&[["1", ""], ["2", ""]]);
        let broken = table(&[["3", ""], ["oops", ""], ["5", ""]]);

        let mut list = TableList::new();
        list.append(&schema, table_rows(&first)).unwrap();
        let err = list.append(&schema, table_rows(&broken)).unwrap_err();

        assert!(matches!(err, ExtractError::InvalidNumber(ref raw) if raw == "oops"));
        let values: Vec<u32> = list.iter().map(|c| c.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
