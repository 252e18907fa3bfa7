//! Property Operations
//!
//! Ownership-checked use cases. Create and delete pair their two document
//! writes (property + owner back-reference) inside one MongoDB
//! transaction; media uploads always complete before the transaction
//! starts, since the media store cannot be rolled back.

pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreatePropertyCommand, CreatePropertyUseCase};
pub use delete::DeletePropertyUseCase;
pub use update::{UpdatePropertyCommand, UpdatePropertyUseCase};
