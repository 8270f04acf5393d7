// src/extractors/mod.rs
pub mod calendar;
pub mod markup;
pub mod registry;
pub mod row;
pub mod schema;
pub mod table;

// Re-export key extraction types for convenience
pub use calendar::{calendar_from_html, extract_calendar, Calendar, DayRecord};
pub use markup::NodeExt;
pub use registry::SchemaRegistry;
pub use row::extract_row;
pub use schema::{FieldSchema, ResolvedSchema, SchemaBuilder, TableRecord};
pub use table::TableList;
