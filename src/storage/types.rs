use std::borrow::Cow;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::util::strip_control_chars;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process holds a lock on the database file
    #[error("The article database is locked by another process. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

/// SQLITE_BUSY (5), SQLITE_LOCKED (6) and SQLITE_CANTOPEN (14) all surface
/// through the error message only.
pub(crate) fn is_lock_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
        || message.contains("unable to open database file")
}

// ============================================================================
// Publish dates
// ============================================================================

/// Storage format for `published_on` (SQLite TEXT, sorts chronologically).
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a publish date as it appears in seed files or on the command line.
///
/// Accepts a bare `YYYY-MM-DD` date or a full RFC 3339 timestamp, in which
/// case only the date part is kept. Blank input means "no date" (a draft).
pub fn parse_publish_date(raw: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Ok(Some(date)),
        Err(date_err) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| Some(ts.date_naive()))
            .map_err(|_| date_err),
    }
}

fn deserialize_publish_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse_publish_date(&raw).map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// An article that has not been stored yet.
///
/// This is the shape of one entry in the seed JSON file. Every known
/// property is copied onto the article; unknown properties are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_publish_date")]
    pub published_on: Option<NaiveDate>,
    #[serde(default)]
    pub body: String,
}

impl NewArticle {
    /// Whether this article has no publish date yet.
    pub fn is_draft(&self) -> bool {
        self.published_on.is_none()
    }
}

/// Article data from the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub author: String,
    pub author_url: Option<String>,
    pub published_on: Option<NaiveDate>,
    /// Markdown source
    pub body: String,
}

impl Article {
    pub fn is_draft(&self) -> bool {
        self.published_on.is_none()
    }
}

/// Internal row type for Article queries (used by sqlx FromRow)
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleDbRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub author: String,
    pub author_url: Option<String>,
    pub published_on: Option<String>,
    pub body: String,
}

impl ArticleDbRow {
    /// Converts a raw row into an `Article`, sanitizing text for terminal output.
    ///
    /// A `published_on` value that no longer parses is treated as a draft
    /// rather than failing the whole query.
    pub(crate) fn into_article(self) -> Article {
        let published_on = match self.published_on.as_deref().map(parse_publish_date) {
            None => None,
            Some(Ok(date)) => date,
            Some(Err(e)) => {
                tracing::warn!(
                    article_id = self.id,
                    raw = ?self.published_on,
                    error = %e,
                    "Unparseable published_on, treating article as draft"
                );
                None
            }
        };

        Article {
            id: self.id,
            title: sanitize(self.title),
            category: sanitize(self.category),
            author: sanitize(self.author),
            author_url: self.author_url.map(sanitize),
            published_on,
            body: sanitize(self.body),
        }
    }
}

fn sanitize(s: String) -> String {
    match strip_control_chars(&s) {
        Cow::Borrowed(_) => s,
        Cow::Owned(clean) => clean,
    }
}
