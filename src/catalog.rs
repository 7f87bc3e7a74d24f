//! The in-memory article list and the "load from database, else seed" flow.

use anyhow::{Context, Result};

use crate::seed::{load_seed, SeedSource};
use crate::stats::{self, AuthorWordCount, BlogStats};
use crate::storage::{Article, Database};

/// How [`ArticleCatalog::fetch_all`] obtained its articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The database already had articles.
    Loaded { count: usize },
    /// The database was empty and was populated from seed data.
    Seeded { inserted: usize },
}

/// Restricts which articles are loaded. Empty fields match everything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArticleFilter {
    pub author: Option<String>,
    pub category: Option<String>,
}

/// Articles currently loaded for display, most recent first.
#[derive(Debug, Default, Clone)]
pub struct ArticleCatalog {
    articles: Vec<Article>,
}

impl ArticleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Replace the loaded list with `rows`, keeping their order.
    pub fn load_all(&mut self, rows: Vec<Article>) {
        self.articles = rows;
    }

    /// Load every article from the database, seeding it first if it is empty.
    ///
    /// Seed articles are written to the database before being loaded, so the
    /// next call reads them back with their ids instead of hitting the seed
    /// source again.
    pub async fn fetch_all(
        &mut self,
        db: &Database,
        source: &SeedSource,
        client: &reqwest::Client,
    ) -> Result<FetchOutcome> {
        let rows = db.fetch_all().await.context("Failed to query articles")?;
        if !rows.is_empty() {
            let count = rows.len();
            tracing::debug!(count, "Loaded articles from database");
            self.load_all(rows);
            return Ok(FetchOutcome::Loaded { count });
        }

        tracing::info!(source = %source, "Article table is empty, loading seed data");
        let seed = load_seed(source, client)
            .await
            .with_context(|| format!("Failed to load seed data from {source}"))?;
        let inserted = db
            .insert_records(&seed)
            .await
            .context("Failed to store seed articles")?;

        let rows = db
            .fetch_all()
            .await
            .context("Failed to query articles after seeding")?;
        self.load_all(rows);

        tracing::info!(inserted, "Seeded article database");
        Ok(FetchOutcome::Seeded { inserted })
    }

    /// Reload only the articles matching `filter`, in `fetch_all` order.
    ///
    /// Leaves the list untouched for an empty filter.
    pub async fn apply_filter(&mut self, db: &Database, filter: &ArticleFilter) -> Result<()> {
        let rows = match (&filter.author, &filter.category) {
            (None, None) => return Ok(()),
            (Some(author), category) => db
                .articles_by_author(author)
                .await
                .context("Failed to query articles by author")?
                .into_iter()
                .filter(|a| category.as_deref().is_none_or(|c| a.category == c))
                .collect(),
            (None, Some(category)) => db
                .articles_by_category(category)
                .await
                .context("Failed to query articles by category")?,
        };

        tracing::debug!(?filter, count = rows.len(), "Applied article filter");
        self.load_all(rows);
        Ok(())
    }

    pub fn find(&self, id: i64) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn all_authors(&self) -> Vec<String> {
        stats::all_authors(&self.articles)
    }

    pub fn all_categories(&self) -> Vec<String> {
        stats::all_categories(&self.articles)
    }

    pub fn num_words_all(&self) -> usize {
        stats::num_words_all(&self.articles)
    }

    pub fn num_words_by_author(&self) -> Vec<AuthorWordCount> {
        stats::num_words_by_author(&self.articles)
    }

    pub fn stats(&self) -> BlogStats {
        BlogStats::compute(&self.articles)
    }
}
