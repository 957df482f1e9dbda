use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};

use crate::domain::{
    repository::TaskRepository,
    task::{Task, TaskId, UpdateTask},
};

#[derive(Clone)]
pub struct SqliteTaskRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTaskRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn insert(&self, title: &str) -> Result<Task> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tasks (title, completed, created_at) VALUES (?1, 0, ?2)",
        )
        .bind(title)
        .bind(now.to_rfc3339())
        .execute(&*self.pool)
        .await?;

        let id = TaskId(result.last_insert_rowid());
        self.get(id)
            .await?
            .context("inserted row missing on read-back")
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let row = sqlx::query(
            "SELECT id, title, completed, created_at FROM tasks WHERE id = ?1",
        )
        .bind(id.0)
        .fetch_optional(&*self.pool)
        .await?;
        row.map(row_to_task).transpose()
    }

    async fn list(&self) -> Result<Vec<Task>> {
        // id breaks ties between rows created within the same instant
        let rows = sqlx::query(
            "SELECT id, title, completed, created_at FROM tasks
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&*self.pool)
        .await?;
        rows.into_iter().map(row_to_task).collect()
    }

    async fn update(&self, id: TaskId, patch: UpdateTask) -> Result<Option<Task>> {
        // SET names only the supplied columns, so concurrent writers updating
        // disjoint fields do not clobber each other.
        let mut sets = Vec::new();
        if patch.title.is_some() {
            sets.push("title = ?");
        }
        if patch.completed.is_some() {
            sets.push("completed = ?");
        }
        if sets.is_empty() {
            return self.get(id).await;
        }

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(title) = &patch.title {
            query = query.bind(title);
        }
        if let Some(completed) = patch.completed {
            query = query.bind(completed);
        }
        let result = query.bind(id.0).execute(&*self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn delete(&self, id: TaskId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_task(row: SqliteRow) -> Result<Task> {
    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .context("malformed created_at in store")?
        .with_timezone(&Utc);
    Ok(Task {
        id: TaskId(row.get("id")),
        title: row.get("title"),
        completed: row.get("completed"),
        created_at,
    })
}

/// Ensure a file-backed SQLite URL points at a creatable file before sqlx
/// opens the pool.
pub fn prepare_sqlite_file(database_url: &str) -> Result<()> {
    if database_url.starts_with("sqlite::memory:") {
        return Ok(());
    }
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        // On Windows, absolute paths may look like /C:/path; strip the leading slash
        let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
            &path[1..]
        } else {
            path
        };
        use std::{fs, fs::OpenOptions, path::Path};
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !p.exists() {
            let _ = OpenOptions::new().create(true).append(true).open(p)?;
        }
    }
    Ok(())
}
