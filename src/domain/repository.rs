use async_trait::async_trait;

use super::task::{Task, TaskId, UpdateTask};

/// The store seam. Implementations issue parameterized statements against a
/// `tasks` table; callers see rows or a data-access fault.
#[async_trait]
pub trait TaskRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    /// Insert a row with `completed = false`, then read back the canonical
    /// row including the store-assigned id and timestamp.
    async fn insert(&self, title: &str) -> anyhow::Result<Task>;
    async fn get(&self, id: TaskId) -> anyhow::Result<Option<Task>>;
    /// All rows, newest first.
    async fn list(&self) -> anyhow::Result<Vec<Task>>;
    /// Apply the supplied fields only; `None` if no row has this id.
    async fn update(&self, id: TaskId, patch: UpdateTask) -> anyhow::Result<Option<Task>>;
    /// `true` if a row was removed.
    async fn delete(&self, id: TaskId) -> anyhow::Result<bool>;
}
