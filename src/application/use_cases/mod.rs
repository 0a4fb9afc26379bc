//! Use Cases
//!
//! Application-specific business rules.
//! Each use case is a single-purpose struct with an execute() method.

pub mod tokens;

pub use tokens::{GetTokenUseCase, ListTokensUseCase, LookupTokenUseCase};
