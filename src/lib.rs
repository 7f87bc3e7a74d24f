//! A small blog article store.
//!
//! Articles live in SQLite. When the database is empty, [`ArticleCatalog::fetch_all`]
//! populates it from a static JSON seed file, then derives author lists and
//! word counts over the loaded articles.

pub mod catalog;
pub mod config;
pub mod render;
pub mod seed;
pub mod stats;
pub mod storage;
pub mod util;

pub use catalog::{ArticleCatalog, ArticleFilter, FetchOutcome};
pub use render::ArticleView;
pub use seed::{SeedError, SeedSource};
pub use stats::{AuthorWordCount, BlogStats};
pub use storage::{Article, Database, DatabaseError, NewArticle};
