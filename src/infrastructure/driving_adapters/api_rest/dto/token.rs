//! Token DTOs
//!
//! Query-string decoding and response bodies for the token endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::models::query::{LookupResult, TokenFilters, TokenListing, TokenPage};
use crate::domain::models::token::TokenRecord;
use crate::shared::errors::ApiError;

/// Query-string flags accept `1` and `true`
fn is_flag_set(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("1" | "true"))
}

/// Listing query string
///
/// Every field is kept as text so a malformed number surfaces as a 400 with
/// our own error body instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListTokensQueryDto {
    pub prefix: Option<String>,
    pub category: Option<String>,
    pub ticker: Option<String>,
    pub address: Option<String>,
    pub limit: Option<String>,
    pub cursor: Option<String>,
    pub order: Option<String>,
    pub full: Option<String>,
}

impl TryFrom<ListTokensQueryDto> for TokenFilters {
    type Error = ApiError;

    fn try_from(dto: ListTokensQueryDto) -> Result<Self, Self::Error> {
        let limit = dto
            .limit
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| ApiError::BadRequest(format!("limit must be a number, got '{raw}'")))
            })
            .transpose()?;

        Ok(Self {
            prefix: dto.prefix.filter(|p| !p.is_empty()),
            category: dto.category,
            ticker: dto.ticker,
            address: dto.address,
            limit,
            cursor: dto.cursor.filter(|c| !c.is_empty()),
            order: dto.order.filter(|o| !o.is_empty()),
            full: is_flag_set(dto.full.as_deref()),
            include_testnet: false,
        })
    }
}

/// Identifier lookup query string
#[derive(Debug, Default, Deserialize)]
pub struct LookupQueryDto {
    pub testnet: Option<String>,
}

impl From<LookupQueryDto> for TokenFilters {
    fn from(dto: LookupQueryDto) -> Self {
        Self {
            include_testnet: is_flag_set(dto.testnet.as_deref()),
            ..Default::default()
        }
    }
}

/// Listing items: bare addresses, or full records when `full` was requested
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TokenItemsDto {
    Keys(Vec<String>),
    Records(Vec<TokenRecord>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub limit: u32,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Listing response body
#[derive(Debug, Serialize)]
pub struct TokenListResponseDto {
    pub tokens: TokenItemsDto,
    pub pagination: PaginationDto,
}

impl From<TokenPage> for TokenListResponseDto {
    fn from(page: TokenPage) -> Self {
        let tokens = match page.items {
            TokenListing::Keys(keys) => TokenItemsDto::Keys(keys),
            TokenListing::Records(records) => TokenItemsDto::Records(records),
        };
        Self {
            tokens,
            pagination: PaginationDto {
                limit: page.limit,
                has_next: page.has_next,
                cursor: page.next_cursor,
            },
        }
    }
}

/// Identifier lookup response body
#[derive(Debug, Serialize)]
pub struct LookupResponseDto {
    pub exists: bool,
    pub amount: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<String>>,
}

impl From<LookupResult> for LookupResponseDto {
    fn from(result: LookupResult) -> Self {
        Self {
            exists: result.exists(),
            amount: result.amount,
            networks: result.networks,
        }
    }
}

/// Version endpoint body
#[derive(Debug, Serialize)]
pub struct VersionResponseDto {
    pub version: &'static str,
    pub environment: &'static str,
}

/// Health endpoint body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponseDto {
    pub current_time: String,
    pub health: &'static str,
}
