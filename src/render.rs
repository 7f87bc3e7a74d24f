//! Presentation data for a single article.
//!
//! Produces the derived fields a page template needs (publish status, age,
//! HTML body) without tying the crate to any particular template engine.

use chrono::NaiveDate;
use pulldown_cmark::{html, Options, Parser};
use serde::Serialize;

use crate::storage::Article;

/// An article prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub author: String,
    pub author_url: Option<String>,
    pub published_on: Option<NaiveDate>,
    /// Whole days since publication; None for drafts
    pub days_ago: Option<i64>,
    pub publish_status: String,
    pub body_html: String,
}

impl ArticleView {
    /// Build the view of `article` as seen on `today`.
    pub fn from_article(article: &Article, today: NaiveDate) -> Self {
        let days_ago = article.published_on.map(|date| days_between(date, today));

        Self {
            id: article.id,
            title: article.title.clone(),
            category: article.category.clone(),
            author: article.author.clone(),
            author_url: article.author_url.clone(),
            published_on: article.published_on,
            days_ago,
            publish_status: publish_status(days_ago),
            body_html: markdown_to_html(&article.body),
        }
    }
}

/// Whole days from `published` to `today`. Negative for future dates.
pub fn days_between(published: NaiveDate, today: NaiveDate) -> i64 {
    (today - published).num_days()
}

/// `"published N days ago"`, or `"(draft)"` without a publish date.
pub fn publish_status(days_ago: Option<i64>) -> String {
    match days_ago {
        Some(days) => format!("published {days} days ago"),
        None => "(draft)".to_string(),
    }
}

/// Render a markdown article body to HTML.
pub fn markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(md, options);
    let mut out = String::with_capacity(md.len() + md.len() / 2);
    html::push_html(&mut out, parser);
    out
}
