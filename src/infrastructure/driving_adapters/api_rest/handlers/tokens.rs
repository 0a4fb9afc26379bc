//! Token Handlers
//!
//! HTTP handlers for the read-only token endpoints under `/.well-known/tokens`.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::application::TokenRequest;
use crate::domain::models::query::TokenFilters;
use crate::domain::models::token::TokenRecord;
use crate::infrastructure::driving_adapters::api_rest::dto::token::{
    ListTokensQueryDto, LookupQueryDto, LookupResponseDto, TokenListResponseDto,
};
use crate::infrastructure::driving_adapters::api_rest::AppState;
use crate::shared::errors::ApiError;

/// Create the router for token endpoints, nested under `/.well-known/tokens`
///
/// The first dynamic segment is named `scope` on every route because it is a
/// network code on some and a token address on others, and the router requires
/// one name per position.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lookup/:network/:identifier", get(lookup_token))
        .route("/:scope/tokens.json", get(list_network_tokens))
        .route("/:scope/:token", get(get_network_token))
        .route("/:scope", get(get_token))
}

/// GET /.well-known/tokens.json - List tokens without a network segment
///
/// # Responses
///
/// * 200 OK - `{tokens, pagination}`
/// * 400 Bad Request - Invalid limit/order, or a filter the backend cannot apply
/// * 404 Not Found - Empty page
pub async fn list_tokens(
    State(state): State<AppState>,
    Query(query): Query<ListTokensQueryDto>,
) -> Result<Json<TokenListResponseDto>, ApiError> {
    let request = TokenRequest {
        filters: TokenFilters::try_from(query)?,
        ..Default::default()
    };

    let page = state.resolver.list_tokens(&request).await?;

    Ok(Json(TokenListResponseDto::from(page)))
}

/// GET /.well-known/tokens/:network/tokens.json - List tokens in a network
#[axum::debug_handler]
async fn list_network_tokens(
    State(state): State<AppState>,
    Path(network): Path<String>,
    Query(query): Query<ListTokensQueryDto>,
) -> Result<Json<TokenListResponseDto>, ApiError> {
    let request = TokenRequest {
        network: Some(network),
        identifier: None,
        filters: TokenFilters::try_from(query)?,
    };

    let page = state.resolver.list_tokens(&request).await?;

    Ok(Json(TokenListResponseDto::from(page)))
}

/// GET /.well-known/tokens/:token - Get a token by address
///
/// # Responses
///
/// * 200 OK - Normalized token record
/// * 404 Not Found - No visible token with this address
#[axum::debug_handler]
async fn get_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<TokenRecord>, ApiError> {
    let request = TokenRequest {
        identifier: Some(token),
        ..Default::default()
    };

    let token = state.resolver.get_token(&request).await?;

    Ok(Json(token))
}

/// GET /.well-known/tokens/:network/:token - Get a token by address within a network
#[axum::debug_handler]
async fn get_network_token(
    State(state): State<AppState>,
    Path((network, token)): Path<(String, String)>,
) -> Result<Json<TokenRecord>, ApiError> {
    let request = TokenRequest {
        network: Some(network),
        identifier: Some(token),
        ..Default::default()
    };

    let token = state.resolver.get_token(&request).await?;

    Ok(Json(token))
}

/// GET /.well-known/tokens/lookup/:network/:identifier - Check a ticker or address
///
/// `network` may be `all`. `?testnet=1` widens the search to testnet records.
///
/// # Responses
///
/// * 200 OK - `{exists, amount, networks?}`
/// * 400 Bad Request - Ticker lookup on a backend that cannot resolve tickers
/// * 404 Not Found - Identifier is not registered
#[axum::debug_handler]
async fn lookup_token(
    State(state): State<AppState>,
    Path((network, identifier)): Path<(String, String)>,
    Query(query): Query<LookupQueryDto>,
) -> Result<Json<LookupResponseDto>, ApiError> {
    let request = TokenRequest {
        network: Some(network),
        identifier: Some(identifier),
        filters: query.into(),
    };

    let result = state.resolver.lookup_token(&request).await?;

    Ok(Json(LookupResponseDto::from(result)))
}
