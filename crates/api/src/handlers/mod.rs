pub mod comment;
pub mod message;
pub mod project;
