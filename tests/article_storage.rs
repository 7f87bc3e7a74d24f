//! Integration tests for file-backed article storage: records survive a
//! reopen and schema setup is idempotent.

use chrono::NaiveDate;
use quill::{Database, NewArticle};
use std::path::PathBuf;

fn temp_db_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quill_storage_test_{name}"));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("articles.db")
}

fn article(title: &str, published_on: Option<NaiveDate>) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        category: "technology".to_string(),
        author: "Ada Lovelace".to_string(),
        author_url: Some("http://hackeripsum.com/".to_string()),
        published_on,
        body: "Parse the protocol.".to_string(),
    }
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let path = temp_db_path("reopen");
    let path_str = path.to_str().unwrap();

    let id = {
        let db = Database::open(path_str).await.unwrap();
        db.insert_record(&article("Persisted", NaiveDate::from_ymd_opt(2015, 2, 12)))
            .await
            .unwrap()
    };

    // Reopening runs the table setup again against the existing file
    let db = Database::open(path_str).await.unwrap();
    let stored = db.get_article(id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Persisted");
    assert_eq!(stored.published_on, NaiveDate::from_ymd_opt(2015, 2, 12));
    assert_eq!(db.count_articles().await.unwrap(), 1);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[cfg(unix)]
#[tokio::test]
async fn test_database_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let path = temp_db_path("permissions");
    let _db = Database::open(path.to_str().unwrap()).await.unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[tokio::test]
async fn test_delete_then_reinsert() {
    let path = temp_db_path("reinsert");
    let db = Database::open(path.to_str().unwrap()).await.unwrap();

    let first = db.insert_record(&article("One", None)).await.unwrap();
    assert!(db.delete_record(first).await.unwrap());
    db.insert_record(&article("Two", None)).await.unwrap();

    let titles: Vec<String> = db
        .fetch_all()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles, vec!["Two"]);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}
