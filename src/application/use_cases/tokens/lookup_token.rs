//! Lookup Token Use Case
//!
//! Checks whether a ticker or address is registered, and on which networks.

use std::sync::Arc;

use crate::domain::gateways::TokenRepository;
use crate::domain::models::network::normalize_network;
use crate::domain::models::query::{Identifier, IdentifierLookupQuery, LookupResult};
use crate::shared::errors::UseCaseError;

/// Network segment that searches every network
pub const ALL_NETWORKS: &str = "all";

/// Use case for identifier existence lookups
pub struct LookupTokenUseCase {
    token_repository: Arc<dyn TokenRepository>,
    testnet_override: bool,
}

impl LookupTokenUseCase {
    /// Create a new LookupTokenUseCase
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
    /// Returns `UseCaseError::Validation` if the identifier is empty.
    /// Returns `UseCaseError::NotFound` if nothing matches.
    /// Returns `UseCaseError::Repository` if the backend fails or cannot resolve tickers.
    pub async fn execute(
        &self,
        network: Option<&str>,
        identifier: &str,
        include_testnet: bool,
    ) -> Result<LookupResult, UseCaseError> {
        if identifier.trim().is_empty() {
            return Err(UseCaseError::invalid("identifier: a token identifier is required"));
        }

        let network = Some(normalize_network(network, ALL_NETWORKS)).filter(|n| n != ALL_NETWORKS);
        let query = IdentifierLookupQuery {
            identifier: Identifier::classify(identifier),
            network,
            include_testnet: include_testnet || self.testnet_override,
        };
        tracing::debug!(
            identifier = %query.identifier,
            address = matches!(query.identifier, Identifier::Address(_)),
            network = query.network.as_deref().unwrap_or(ALL_NETWORKS),
            include_testnet = query.include_testnet,
            backend = self.token_repository.backend(),
            "Looking up token identifier"
        );

        let result = self.token_repository.lookup_identifier(&query).await?;

        if !result.exists() {
            tracing::warn!(identifier = %query.identifier, "Token identifier not found");
            return Err(UseCaseError::not_found("Token", query.identifier.as_str()));
        }

        tracing::debug!(amount = result.amount, "Token identifier found");
        Ok(result)
    }
}
