//! Token Use Cases
//!
//! Read-only token queries: point lookup, listing, and identifier lookup.

mod get_token;
mod list_tokens;
mod lookup_token;

pub use get_token::GetTokenUseCase;
pub use list_tokens::ListTokensUseCase;
pub use lookup_token::LookupTokenUseCase;
