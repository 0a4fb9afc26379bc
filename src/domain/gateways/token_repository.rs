//! Token Repository Gateway
//!
//! The capability interface every storage backend implements. A backend that
//! cannot answer a query returns `RepositoryError::Unsupported` instead of an
//! empty result, so callers can tell "does not exist" from "cannot ask".

use async_trait::async_trait;

use crate::domain::models::query::{FindTokenQuery, IdentifierLookupQuery, ListTokensQuery, LookupResult, TokenPage};
use crate::domain::models::token::TokenRecord;
use crate::shared::errors::RepositoryError;

/// Repository trait for read-only token queries
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend(&self) -> &'static str;

    /// Find a single visible token by address
    async fn find_token(&self, query: &FindTokenQuery) -> Result<Option<TokenRecord>, RepositoryError>;

    /// List one page of tokens matching the query
    async fn list_tokens(&self, query: &ListTokensQuery) -> Result<TokenPage, RepositoryError>;

    /// Count tokens matching a ticker or address identifier
    async fn lookup_identifier(&self, query: &IdentifierLookupQuery) -> Result<LookupResult, RepositoryError>;
}
