// src/riro/pages.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extractors::registry::SchemaRegistry;
use crate::extractors::schema::{ResolvedSchema, TableRecord};
use crate::extractors::table::TableList;
use crate::riro::client::PageSource;
use crate::riro::models::{DbInfo, PagePolicy, PAGE_SIZE};
use crate::utils::error::{AppError, ExtractError};

static BOARD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.rd_board").expect("Failed to compile BOARD_SELECTOR"));
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

/// Every `<tr>` of the board table, header included.
pub fn board_rows(document: &Html) -> Result<Vec<ElementRef<'_>>, ExtractError> {
    let table = document
        .select(&BOARD_SELECTOR)
        .next()
        .and_then(|board| board.select(&TABLE_SELECTOR).next())
        .ok_or_else(|| ExtractError::TableNotFound("Table not found in the response".to_string()))?;

    Ok(table.select(&ROW_SELECTOR).collect())
}

/// Extracts one board page onto `list` and returns how many data rows it had.
pub fn append_page<T: TableRecord>(
    list: &mut TableList<T>,
    schema: &ResolvedSchema<T>,
    html: &str,
) -> Result<usize, ExtractError> {
    let document = Html::parse_document(html);
    let rows = board_rows(&document)?;

    // First row is the column header
    let data_rows = rows.len().saturating_sub(1);
    list.append(schema, rows.into_iter().skip(1))?;
    Ok(data_rows)
}

/// Merges saved pages, in order, onto `list` and returns how many pages were
/// merged.
///
/// The list belongs to the caller: when page K fails, the records of pages
/// 1..K-1 (and the rows of page K read before the failure) are still in it.
pub fn table_from_pages<T, S>(
    registry: &SchemaRegistry,
    pages: &[S],
    list: &mut TableList<T>,
) -> Result<usize, AppError>
where
    T: TableRecord,
    S: AsRef<str>,
{
    // 1. Resolve the record layout once for the whole run
    let schema = registry.resolve::<T>()?;

    // 2. Merge page by page; an error leaves what was merged so far in `list`
    for (i, html) in pages.iter().enumerate() {
        let rows = append_page(list, &schema, html.as_ref())?;
        tracing::info!("Page {}: {} {} rows, {} total", i + 1, rows, T::KIND, list.len());
    }
    Ok(pages.len())
}

/// Requests `info.page_count()` pages of `T`'s board and merges them onto
/// `list` in page order. With [`PagePolicy::StopOnShortPage`] a page shorter
/// than [`PAGE_SIZE`] ends the walk early. Returns how many pages were merged.
///
/// As with [`table_from_pages`], a failed page does not take earlier pages
/// with it; the caller decides what to do with the partial list.
pub async fn fetch_table<T, S>(
    source: &S,
    registry: &SchemaRegistry,
    info: &DbInfo,
    policy: PagePolicy,
    list: &mut TableList<T>,
) -> Result<usize, AppError>
where
    T: TableRecord,
    S: PageSource,
{
    // 1. Resolve the record layout and work out how many pages to ask for
    let schema = registry.resolve::<T>()?;
    let pages = info.page_count();
    let before = list.len();
    let mut merged = 0;

    for page in 1..=pages {
        // 2. Fetch and merge the page (pacing is the source's concern)
        let html = source.fetch_page(T::PATH, info, page).await?;
        let rows = append_page(list, &schema, &html)?;
        merged += 1;
        tracing::debug!("Page {}/{}: {} rows, {} total", page, pages, rows, list.len());

        // 3. A board whose first page is empty has nothing to page through
        if page == 1 && rows == 0 {
            return Err(ExtractError::NoData("Table must contain header and at least one data row".to_string()).into());
        }

        // 4. Optionally stop at the first short page
        if policy == PagePolicy::StopOnShortPage && rows < PAGE_SIZE {
            tracing::info!("Page {} had {} rows, stopping early", page, rows);
            break;
        }
    }

    if list.len() == before {
        return Err(ExtractError::NoData(format!("No {} rows found", T::KIND)).into());
    }
    tracing::info!("Fetched {} {} records over {} pages", list.len() - before, T::KIND, merged);
    Ok(merged)
}
