//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query functions.
//! Reads accept any [`sqlx::PgExecutor`] so they can run on the pool or
//! inside a snapshot transaction; writes take the transaction's
//! `&mut PgConnection`.

pub mod comment_repo;
pub mod description_repo;
pub mod message_repo;
pub mod objective_repo;
pub mod project_repo;

pub use comment_repo::CommentRepo;
pub use description_repo::DescriptionRepo;
pub use message_repo::MessageRepo;
pub use objective_repo::ObjectiveRepo;
pub use project_repo::ProjectRepo;
