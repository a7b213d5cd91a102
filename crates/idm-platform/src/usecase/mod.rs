//! Use case infrastructure
//!
//! Every state-changing operation is a use case: a struct built from its
//! repositories that exposes `execute(command, ctx)` and returns
//! `Result<_, UseCaseError>`.

pub mod error;
pub mod execution_context;

pub use error::UseCaseError;
pub use execution_context::ExecutionContext;
