//! List Tokens Use Case
//!
//! Lists one page of tokens, optionally scoped to a network and narrowed by
//! prefix, category, ticker and address filters.

use std::sync::Arc;

use validator::Validate;

use crate::domain::gateways::TokenRepository;
use crate::domain::models::network::NetworkContext;
use crate::domain::models::query::{split_list, ListTokensQuery, SortOrder, TokenFilters, TokenPage, MAX_LIMIT};
use crate::shared::errors::UseCaseError;

/// Use case for listing tokens
pub struct ListTokensUseCase {
    token_repository: Arc<dyn TokenRepository>,
    testnet_override: bool,
}

impl ListTokensUseCase {
    /// Create a new ListTokensUseCase
    #[must_use]
    pub fn new(token_repository: Arc<dyn TokenRepository>, testnet_override: bool) -> Self {
        Self {
            token_repository,
            testnet_override,
        }
    }

    /// Execute the use case
    ///
    /// `limit` and `order` are validated before the backend is touched.
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` for an out-of-range limit or unknown order.
    /// Returns `UseCaseError::NotFound` if the page is empty.
    /// Returns `UseCaseError::Repository` if the backend fails or cannot apply a filter.
    pub async fn execute(&self, network: Option<&str>, filters: &TokenFilters) -> Result<TokenPage, UseCaseError> {
        filters.validate()?;
        let order = filters
            .order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()
            .map_err(UseCaseError::invalid)?
            .unwrap_or_default();

        let query = ListTokensQuery {
            network: NetworkContext::resolve(network, self.testnet_override),
            prefix: filters.prefix.clone(),
            categories: split_list(filters.category.as_deref()),
            tickers: split_list(filters.ticker.as_deref()),
            addresses: split_list(filters.address.as_deref()),
            limit: filters.limit.unwrap_or(MAX_LIMIT),
            cursor: filters.cursor.clone(),
            order,
            full: filters.full,
        };
        tracing::debug!(
            network = query.network.code(),
            testnet = query.network.testnet(),
            limit = query.limit,
            backend = self.token_repository.backend(),
            "Listing tokens"
        );

        let page = self.token_repository.list_tokens(&query).await?;

        if page.items.is_empty() {
            tracing::warn!(network = query.network.code(), "No tokens found");
            return Err(UseCaseError::not_found("Tokens", query.network.code()));
        }

        tracing::debug!(count = page.items.len(), has_next = page.has_next, "Listed tokens");
        Ok(page)
    }
}
