//! HTTP Handlers

pub mod status;
pub mod tokens;
