use async_trait::async_trait;

use crate::domain::repository::TaskRepository;
use crate::domain::task::{CreateTask, Task, TaskId, UpdateTask};

use super::error::TaskError;

#[async_trait]
pub trait TaskService: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Task>, TaskError>;
    async fn create(&self, input: CreateTask) -> Result<Task, TaskError>;
    async fn update(&self, id: TaskId, patch: UpdateTask) -> Result<Task, TaskError>;
    /// Idempotent: deleting an absent id is a no-op success.
    async fn delete(&self, id: TaskId) -> Result<(), TaskError>;
}

#[derive(Clone)]
pub struct TaskServiceImpl<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskServiceImpl<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: TaskRepository> TaskService for TaskServiceImpl<R> {
    async fn list(&self) -> Result<Vec<Task>, TaskError> {
        Ok(self.repo.list().await?)
    }

    async fn create(&self, input: CreateTask) -> Result<Task, TaskError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(TaskError::Validation("title must not be empty".into()));
        }
        Ok(self.repo.insert(title).await?)
    }

    async fn update(&self, id: TaskId, mut patch: UpdateTask) -> Result<Task, TaskError> {
        if patch.is_empty() {
            return Err(TaskError::Validation("no fields to update".into()));
        }
        if let Some(title) = &patch.title {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(TaskError::Validation("title must not be empty".into()));
            }
            patch.title = Some(trimmed.to_string());
        }
        self.repo.update(id, patch).await?.ok_or(TaskError::NotFound)
    }

    async fn delete(&self, id: TaskId) -> Result<(), TaskError> {
        self.repo.delete(id).await?;
        Ok(())
    }
}
