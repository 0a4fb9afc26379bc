//! Query Models
//!
//! Request filters as supplied by callers, and the resolved queries handed to
//! token repositories.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use validator::Validate;

use super::network::NetworkContext;
use super::token::TokenRecord;

/// Largest page a listing may request
pub const MAX_LIMIT: u32 = 1000;

/// Identifiers longer than this are treated as addresses
pub const IDENTIFIER_ADDRESS_MIN_LENGTH: usize = 11;

lazy_static! {
    /// Accepted values of the `order` filter
    static ref ORDER_REGEX: Regex = Regex::new(r"^(asc|desc)$").expect("valid regex");
}

/// Listing sort direction on `ticker`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("order must be 'asc' or 'desc', got '{other}'")),
        }
    }
}

/// Filters and paging parameters supplied with a request
#[derive(Debug, Clone, Default, Validate)]
pub struct TokenFilters {
    pub prefix: Option<String>,
    pub category: Option<String>,
    pub ticker: Option<String>,
    pub address: Option<String>,

    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: Option<u32>,

    pub cursor: Option<String>,

    #[validate(regex(path = *ORDER_REGEX, message = "order must be 'asc' or 'desc'"))]
    pub order: Option<String>,

    /// Return full records instead of bare addresses
    pub full: bool,

    /// Include testnet tokens in identifier lookups
    pub include_testnet: bool,
}

/// Split a comma-separated filter value into trimmed, non-empty items
#[must_use]
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// A ticker or address used by identifier lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Address(String),
    Ticker(String),
}

impl Identifier {
    /// Classify by length: anything longer than 11 characters is an address
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.chars().count() > IDENTIFIER_ADDRESS_MIN_LENGTH {
            Self::Address(raw.to_string())
        } else {
            Self::Ticker(raw.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Address(s) | Self::Ticker(s) => s,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point lookup of a single token by address
#[derive(Debug, Clone)]
pub struct FindTokenQuery {
    pub address: String,
    pub network: NetworkContext,
}

/// Resolved listing query
#[derive(Debug, Clone)]
pub struct ListTokensQuery {
    pub network: NetworkContext,
    pub prefix: Option<String>,
    pub categories: Vec<String>,
    pub tickers: Vec<String>,
    pub addresses: Vec<String>,
    pub limit: u32,
    pub cursor: Option<String>,
    pub order: SortOrder,
    pub full: bool,
}

impl ListTokensQuery {
    /// Whether any attribute filter beyond the address prefix was requested
    #[must_use]
    pub fn has_secondary_filters(&self) -> bool {
        !self.categories.is_empty() || !self.tickers.is_empty() || !self.addresses.is_empty()
    }
}

/// Existence lookup by ticker or address
#[derive(Debug, Clone)]
pub struct IdentifierLookupQuery {
    pub identifier: Identifier,
    /// `None` searches every network
    pub network: Option<String>,
    pub include_testnet: bool,
}

/// Items of a listing page
#[derive(Debug, Clone, PartialEq)]
pub enum TokenListing {
    Keys(Vec<String>),
    Records(Vec<TokenRecord>),
}

impl TokenListing {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Keys(keys) => keys.len(),
            Self::Records(records) => records.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPage {
    pub items: TokenListing,
    pub limit: u32,
    pub has_next: bool,
    pub next_cursor: Option<String>,
}

/// Outcome of an identifier lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub amount: usize,
    /// Distinct matching networks, reported only for all-network lookups
    pub networks: Option<Vec<String>>,
}

impl LookupResult {
    #[must_use]
    pub fn exists(&self) -> bool {
        self.amount > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_classification() {
        assert_eq!(Identifier::classify("ctn"), Identifier::Ticker("ctn".to_string()));
        assert_eq!(
            Identifier::classify("abcdefghijk"),
            Identifier::Ticker("abcdefghijk".to_string())
        );
        assert!(matches!(Identifier::classify("abcdefghijkl"), Identifier::Address(_)));
        assert!(matches!(
            Identifier::classify("cb7173879e9f4b6f6b8d2e9cbbb3b8b1e1a1c3d2"),
            Identifier::Address(_)
        ));
    }

    #[test]
    fn test_identifier_is_trimmed() {
        assert_eq!(Identifier::classify("  ctn "), Identifier::Ticker("ctn".to_string()));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("CTN, XYZ ,,")), vec!["CTN", "XYZ"]);
        assert!(split_list(Some("")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Desc));
        assert!("DESC".parse::<SortOrder>().is_err());
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_filters_validation() {
        assert!(TokenFilters::default().validate().is_ok());

        let ok = TokenFilters {
            limit: Some(1000),
            order: Some("desc".to_string()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        for limit in [0, 1001] {
            let bad = TokenFilters {
                limit: Some(limit),
                ..Default::default()
            };
            assert!(bad.validate().is_err(), "limit {limit} should be rejected");
        }

        let bad_order = TokenFilters {
            order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(bad_order.validate().is_err());
    }
}
