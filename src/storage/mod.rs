mod articles;
mod schema;
mod types;

pub use schema::Database;
pub use types::{parse_publish_date, Article, DatabaseError, NewArticle};
