pub mod error;
pub mod task_service;
