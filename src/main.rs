use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use quill::config::{config_dir, Config};
use quill::storage::parse_publish_date;
use quill::util::{pad_to_width, truncate_to_width};
use quill::{
    ArticleCatalog, ArticleFilter, ArticleView, Database, DatabaseError, FetchOutcome, NewArticle,
};

#[derive(Parser, Debug)]
#[command(name = "quill", about = "Blog article store backed by SQLite")]
struct Args {
    /// Config file (default: ~/.config/quill/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config file
    #[arg(long, value_name = "FILE", global = true)]
    db: Option<PathBuf>,

    /// Seed data path or URL, overriding the config file
    #[arg(long, value_name = "PATH|URL", global = true)]
    seed: Option<String>,

    /// Reset database (delete and recreate)
    #[arg(long, global = true)]
    reset_db: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List articles, newest first (seeds an empty database)
    List {
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Print one article, rendered, as JSON
    Show { id: i64 },
    /// Author list and word counts
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a single article
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        author_url: Option<String>,
        /// YYYY-MM-DD; omit for a draft
        #[arg(long)]
        published_on: Option<String>,
        /// Markdown body
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the markdown body from a file
        #[arg(long, value_name = "FILE")]
        body_file: Option<PathBuf>,
    },
    /// Delete an article by id
    Delete { id: i64 },
    /// Delete every article
    Truncate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(seed) = &args.seed {
        config.seed = seed.clone();
    }

    let db_path = args
        .db
        .clone()
        .unwrap_or_else(|| config.database_path_in(&config_dir));
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!("Error: {}", DatabaseError::InstanceLocked);
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };

    match args.command {
        Command::List { author, category } => {
            let mut catalog = load_catalog(&db, &config).await?;
            catalog
                .apply_filter(&db, &ArticleFilter { author, category })
                .await?;
            let articles = catalog.articles();

            if articles.is_empty() {
                println!("No articles.");
            }
            for article in articles {
                let date = article
                    .published_on
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "(draft)".to_string());
                let title = truncate_to_width(&article.title, config.list_title_width);
                println!(
                    "{:>5}  {:<10}  {}  {}",
                    article.id,
                    date,
                    pad_to_width(&title, config.list_title_width),
                    article.author
                );
            }
        }
        Command::Show { id } => {
            let article = db
                .get_article(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No article with id {id}"))?;
            let view = ArticleView::from_article(&article, Utc::now().date_naive());
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Stats { json } => {
            let catalog = load_catalog(&db, &config).await?;
            let stats = catalog.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Articles: {}", stats.article_count);
                println!("Authors:  {}", stats.author_count);
                println!("Words:    {}", stats.total_words);
                println!();
                for entry in &stats.words_by_author {
                    println!("{:>8}  {}", entry.num_words, entry.name);
                }
            }
        }
        Command::Add {
            title,
            category,
            author,
            author_url,
            published_on,
            body,
            body_file,
        } => {
            let body = match (body, body_file) {
                (Some(body), _) => body,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read body from {}", path.display()))?,
                (None, None) => String::new(),
            };
            let published_on = match published_on {
                Some(raw) => parse_publish_date(&raw)
                    .with_context(|| format!("Invalid publish date '{raw}'"))?,
                None => None,
            };
            let article = NewArticle {
                title,
                category,
                author,
                author_url,
                published_on,
                body,
            };
            let id = db.insert_record(&article).await?;
            println!("Added article {id}.");
        }
        Command::Delete { id } => {
            if db.delete_record(id).await? {
                println!("Deleted article {id}.");
            } else {
                anyhow::bail!("No article with id {id}");
            }
        }
        Command::Truncate => {
            let deleted = db.truncate_table().await?;
            println!("Deleted {deleted} articles.");
        }
    }

    Ok(())
}

/// Load all articles, seeding an empty database from the configured source.
async fn load_catalog(db: &Database, config: &Config) -> Result<ArticleCatalog> {
    let source = config.seed_source().context("Invalid seed source")?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let mut catalog = ArticleCatalog::new();
    match catalog.fetch_all(db, &source, &client).await? {
        FetchOutcome::Loaded { count } => tracing::debug!(count, "Articles loaded"),
        FetchOutcome::Seeded { inserted } => {
            println!("Seeded {inserted} articles from {source}.");
        }
    }
    Ok(catalog)
}
