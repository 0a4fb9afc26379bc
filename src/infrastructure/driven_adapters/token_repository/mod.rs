//! Token Repositories
//!
//! The two interchangeable storage backends behind `TokenRepository`.

pub mod d1;
pub mod kv;
pub mod query_builder;

pub use d1::D1TokenRepository;
pub use kv::KvTokenRepository;
