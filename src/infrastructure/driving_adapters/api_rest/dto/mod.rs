//! Data Transfer Objects
//!
//! Request and response DTOs for the REST API.

pub mod token;

pub use token::{
    HealthResponseDto, ListTokensQueryDto, LookupQueryDto, LookupResponseDto, TokenListResponseDto,
    VersionResponseDto,
};
