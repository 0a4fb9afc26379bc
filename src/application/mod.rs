//! Application Layer
//!
//! Contains use cases that orchestrate token queries and the resolver that
//! dispatches requests to them.
//! Use cases depend on domain gateways (abstractions), not concrete implementations.

pub mod resolver;
pub mod use_cases;

pub use resolver::{TokenQueryResolver, TokenRequest};
