pub mod repository;
pub mod task;
