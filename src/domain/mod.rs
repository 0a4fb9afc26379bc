//! Domain Layer
//!
//! Contains the token model, the record normalizer, query types, and the
//! repository gateway trait (port). This layer has no dependencies on
//! infrastructure.

pub mod gateways;
pub mod models;

pub use gateways::token_repository::TokenRepository;
pub use models::token::TokenRecord;
