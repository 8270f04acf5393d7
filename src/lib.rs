// src/lib.rs

//! Typed extraction of Riro School board tables and calendars.
//!
//! Record types declare which column feeds which field and which function
//! reads it (`extractors::TableRecord`); the engine resolves that once per
//! type, then turns `<tr>` rows into records and merges pages into a
//! `TableList`. Calendar grids take a fixed path to `DayRecord`s.
pub mod extractors;
pub mod items;
pub mod riro;
pub mod storage;
pub mod utils;

pub use extractors::{
    calendar_from_html, extract_calendar, extract_row, Calendar, DayRecord, FieldSchema, ResolvedSchema,
    SchemaBuilder, SchemaRegistry, TableList, TableRecord,
};
pub use utils::AppError;
