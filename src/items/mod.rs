// src/items/mod.rs

//! Record layouts of the boards the extractor understands. Each type lists
//! its columns and extractors; the engine in `extractors` does the rest.
pub mod board;
pub mod cells;
pub mod meal;
pub mod portfolio;

pub use board::{BoardItem, BoardTarget, BoardType, VoteAnnotation};
pub use meal::MealApplicationItem;
pub use portfolio::{Grade, PortfolioItem, PortfolioSubject, PortfolioTitle, PortfolioType};
