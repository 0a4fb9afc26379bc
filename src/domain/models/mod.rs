//! Domain Models
//!
//! Network identity, the canonical token record, and query types.

pub mod network;
pub mod query;
pub mod token;

pub use network::{is_testnet_network, normalize_network, NetworkContext};
pub use query::{
    FindTokenQuery, Identifier, IdentifierLookupQuery, ListTokensQuery, LookupResult, SortOrder, TokenFilters,
    TokenListing, TokenPage,
};
pub use token::{normalize, RawTokenRecord, TokenRecord};
