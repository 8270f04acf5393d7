// src/riro/mod.rs
pub mod client;
pub mod models;
pub mod pages;

pub use client::{ClientConfig, PageSource, RiroClient};
pub use models::{DbId, DbInfo, PagePolicy, PAGE_SIZE};
pub use pages::{fetch_table, table_from_pages};
