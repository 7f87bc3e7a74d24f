//! Aggregate statistics over a list of articles.
//!
//! All functions take a slice so they work equally on the catalog's loaded
//! articles or on a filtered subset.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::storage::Article;

/// A run of ASCII word characters (letters, digits, underscore).
static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\w)+").expect("word pattern is a valid regex")
});

/// Word count for one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorWordCount {
    pub name: String,
    pub num_words: usize,
}

/// Summary figures for a set of articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub article_count: usize,
    pub author_count: usize,
    pub total_words: usize,
    pub words_by_author: Vec<AuthorWordCount>,
}

impl BlogStats {
    pub fn compute(articles: &[Article]) -> Self {
        let words_by_author = num_words_by_author(articles);
        Self {
            article_count: articles.len(),
            author_count: words_by_author.len(),
            total_words: num_words_all(articles),
            words_by_author,
        }
    }
}

/// Number of words in `text`. Markdown punctuation is not counted.
pub fn word_count(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// Unique values of `key`, in the order they are first seen.
fn unique_in_order<'a>(
    articles: &'a [Article],
    key: impl Fn(&'a Article) -> &'a str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    articles
        .iter()
        .map(key)
        .filter(|value| seen.insert(*value))
        .map(str::to_owned)
        .collect()
}

/// Every distinct author, in first-seen order.
pub fn all_authors(articles: &[Article]) -> Vec<String> {
    unique_in_order(articles, |a| a.author.as_str())
}

/// Every distinct category, in first-seen order.
pub fn all_categories(articles: &[Article]) -> Vec<String> {
    unique_in_order(articles, |a| a.category.as_str())
}

/// Total words across all article bodies.
pub fn num_words_all(articles: &[Article]) -> usize {
    articles.iter().map(|a| word_count(&a.body)).sum()
}

/// Words written by each author, in [`all_authors`] order.
pub fn num_words_by_author(articles: &[Article]) -> Vec<AuthorWordCount> {
    all_authors(articles)
        .into_iter()
        .map(|name| {
            let num_words = articles
                .iter()
                .filter(|a| a.author == name)
                .map(|a| word_count(&a.body))
                .sum();
            AuthorWordCount { name, num_words }
        })
        .collect()
}
