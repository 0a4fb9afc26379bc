//! Token Query Resolver
//!
//! Single entry point the HTTP layer calls. Owns the configured backend and
//! the deployment-wide testnet override, and dispatches each request to the
//! matching use case.

use std::sync::Arc;

use crate::application::use_cases::tokens::{GetTokenUseCase, ListTokensUseCase, LookupTokenUseCase};
use crate::domain::gateways::TokenRepository;
use crate::domain::models::query::{LookupResult, TokenFilters, TokenPage};
use crate::domain::models::token::TokenRecord;
use crate::shared::errors::UseCaseError;

/// A request as decoded from the route and query string
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    /// Raw network path segment, if the route had one
    pub network: Option<String>,
    /// Token address or ticker, depending on the operation
    pub identifier: Option<String>,
    pub filters: TokenFilters,
}

impl TokenRequest {
    fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    fn identifier(&self) -> &str {
        self.identifier.as_deref().unwrap_or_default()
    }
}

/// Dispatches token requests to the configured storage backend
pub struct TokenQueryResolver {
    backend: &'static str,
    get_token: GetTokenUseCase,
    list_tokens: ListTokensUseCase,
    lookup_token: LookupTokenUseCase,
}

impl TokenQueryResolver {
    /// Create a resolver over one backend
    #[must_use]
    pub fn new(token_repository: Arc<dyn TokenRepository>, testnet_override: bool) -> Self {
        Self {
            backend: token_repository.backend(),
            get_token: GetTokenUseCase::new(token_repository.clone(), testnet_override),
            list_tokens: ListTokensUseCase::new(token_repository.clone(), testnet_override),
            lookup_token: LookupTokenUseCase::new(token_repository, testnet_override),
        }
    }

    /// Name of the backend serving this deployment
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Resolve a single token by address
    ///
    /// # Errors
    ///
    /// See [`GetTokenUseCase::execute`].
    pub async fn get_token(&self, request: &TokenRequest) -> Result<TokenRecord, UseCaseError> {
        self.get_token.execute(request.network(), request.identifier()).await
    }

    /// List one page of tokens
    ///
    /// # Errors
    ///
    /// See [`ListTokensUseCase::execute`].
    pub async fn list_tokens(&self, request: &TokenRequest) -> Result<TokenPage, UseCaseError> {
        self.list_tokens.execute(request.network(), &request.filters).await
    }

    /// Check whether an identifier is registered
    ///
    /// # Errors
    ///
    /// See [`LookupTokenUseCase::execute`].
    pub async fn lookup_token(&self, request: &TokenRequest) -> Result<LookupResult, UseCaseError> {
        self.lookup_token
            .execute(request.network(), request.identifier(), request.filters.include_testnet)
            .await
    }
}
