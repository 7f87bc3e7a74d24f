use anyhow::Result;
use chrono::NaiveDate;
use sqlx::QueryBuilder;

use super::schema::Database;
use super::types::{Article, ArticleDbRow, NewArticle, DATE_FORMAT};

/// Seed batches stay well under SQLite's 999 parameter limit (6 columns * 100 = 600).
const INSERT_BATCH_SIZE: usize = 100;

const SELECT_COLUMNS: &str =
    "SELECT id, title, category, author, author_url, published_on, body FROM articles";

/// Newest first. NULL dates (drafts) sort lowest, so they land at the end.
const ORDER_NEWEST_FIRST: &str = "ORDER BY published_on DESC, id ASC";

fn date_param(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

impl Database {
    // ========================================================================
    // Article Mutations
    // ========================================================================

    /// Insert one article, returning its new database id.
    pub async fn insert_record(&self, article: &NewArticle) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO articles (title, category, author, author_url, published_on, body)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
        "#,
        )
        .bind(&article.title)
        .bind(&article.category)
        .bind(&article.author)
        .bind(&article.author_url)
        .bind(date_param(article.published_on))
        .bind(&article.body)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.0, title = %article.title, "Inserted article");
        Ok(row.0)
    }

    /// Insert many articles in a single transaction, returning the number inserted.
    ///
    /// Either every article is stored or none is.
    pub async fn insert_records(&self, articles: &[NewArticle]) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted: usize = 0;

        for chunk in articles.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
                "INSERT INTO articles (title, category, author, author_url, published_on, body) ",
            );
            builder.push_values(chunk, |mut b, article| {
                b.push_bind(&article.title)
                    .push_bind(&article.category)
                    .push_bind(&article.author)
                    .push_bind(&article.author_url)
                    .push_bind(date_param(article.published_on))
                    .push_bind(&article.body);
            });

            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        tracing::debug!(count = inserted, "Inserted article batch");
        Ok(inserted)
    }

    /// Overwrite every column of an existing article. Returns false if no
    /// article has that id.
    pub async fn update_record(&self, article: &Article) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, category = ?, author = ?, author_url = ?, published_on = ?, body = ?
            WHERE id = ?
        "#,
        )
        .bind(&article.title)
        .bind(&article.category)
        .bind(&article.author)
        .bind(&article.author_url)
        .bind(date_param(article.published_on))
        .bind(&article.body)
        .bind(article.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete an article by id. Returns false if no article has that id.
    pub async fn delete_record(&self, article_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(article_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        tracing::debug!(id = article_id, deleted, "Delete article");
        Ok(deleted)
    }

    /// Remove every article, returning how many rows were deleted.
    ///
    /// The table itself is kept, so the database is immediately ready for
    /// a fresh seed.
    pub async fn truncate_table(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles")
            .execute(&self.pool)
            .await?;

        tracing::info!(deleted = result.rows_affected(), "Truncated articles table");
        Ok(result.rows_affected())
    }

    // ========================================================================
    // Article Queries
    // ========================================================================

    /// All articles, most recently published first. Drafts come last.
    pub async fn fetch_all(&self) -> Result<Vec<Article>> {
        let sql = format!("{SELECT_COLUMNS} {ORDER_NEWEST_FIRST}");
        let rows = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }

    /// Get a single article by its ID.
    pub async fn get_article(&self, article_id: i64) -> Result<Option<Article>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ArticleDbRow::into_article))
    }

    /// Articles written by `author`, in `fetch_all` order.
    pub async fn articles_by_author(&self, author: &str) -> Result<Vec<Article>> {
        let sql = format!("{SELECT_COLUMNS} WHERE author = ? {ORDER_NEWEST_FIRST}");
        let rows = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(author)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }

    /// Articles filed under `category`, in `fetch_all` order.
    pub async fn articles_by_category(&self, category: &str) -> Result<Vec<Article>> {
        let sql = format!("{SELECT_COLUMNS} WHERE category = ? {ORDER_NEWEST_FIRST}");
        let rows = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }

    /// Number of stored articles.
    pub async fn count_articles(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
