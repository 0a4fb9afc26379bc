//! Get Token Use Case
//!
//! Resolves a single token by address.

use std::sync::Arc;

use crate::domain::gateways::TokenRepository;
use crate::domain::models::network::NetworkContext;
use crate::domain::models::query::FindTokenQuery;
use crate::domain::models::token::TokenRecord;
use crate::shared::errors::UseCaseError;

/// Use case for getting a token by address
pub struct GetTokenUseCase {
    token_repository: Arc<dyn TokenRepository>,
    testnet_override: bool,
}

impl GetTokenUseCase {
    /// Create a new GetTokenUseCase
    #[must_use]
    pub fn new(token_repository: Arc<dyn TokenRepository>, testnet_override: bool) -> Self {
        Self {
            token_repository,
            testnet_override,
        }
    }

    /// Execute the use case
    ///
    /// # Errors
    ///
    /// Returns `UseCaseError::Validation` if the address is empty.
    /// Returns `UseCaseError::NotFound` if no visible token has this address.
    /// Returns `UseCaseError::Repository` if the backend fails.
    pub async fn execute(&self, network: Option<&str>, address: &str) -> Result<TokenRecord, UseCaseError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(UseCaseError::invalid("token: a token address is required"));
        }

        let query = FindTokenQuery {
            address: address.to_string(),
            network: NetworkContext::resolve(network, self.testnet_override),
        };
        tracing::debug!(
            address,
            network = query.network.code(),
            testnet = query.network.testnet(),
            backend = self.token_repository.backend(),
            "Getting token by address"
        );

        let token = self.token_repository.find_token(&query).await?.ok_or_else(|| {
            tracing::warn!(address, "Token not found");
            UseCaseError::not_found("Token", address)
        })?;

        tracing::debug!(address, "Token found");
        Ok(token)
    }
}
