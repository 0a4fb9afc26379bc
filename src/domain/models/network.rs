//! Network Identity
//!
//! Normalizes user-supplied network codes and decides testnet-ness.

/// Network used when a request does not name one
pub const DEFAULT_NETWORK: &str = "xcb";

/// Network codes that denote a testnet
pub const TESTNET_NETWORKS: &[&str] = &["xab", "tbtc", "tltc", "bchtest", "teth", "tsol", "txmr", "tdot"];

/// Lowercase a non-empty network code, or fall back to `default`
#[must_use]
pub fn normalize_network(raw: Option<&str>, default: &str) -> String {
    match raw {
        Some(code) if !code.is_empty() => code.to_lowercase(),
        _ => default.to_string(),
    }
}

/// Whether a network code belongs to a testnet
#[must_use]
pub fn is_testnet_network(code: &str) -> bool {
    let code = code.to_lowercase();
    code == "testnet" || TESTNET_NETWORKS.contains(&code.as_str())
}

/// Network identity resolved for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    code: String,
    testnet: bool,
    explicit: bool,
}

impl NetworkContext {
    /// Resolve the network segment of a request.
    ///
    /// Testnet-ness is the code's own testnet membership OR the deployment-wide
    /// override. `explicit` records whether the caller supplied a segment at all.
    #[must_use]
    pub fn resolve(segment: Option<&str>, testnet_override: bool) -> Self {
        let explicit = segment.is_some_and(|s| !s.is_empty());
        let code = normalize_network(segment, DEFAULT_NETWORK);
        let testnet = is_testnet_network(&code) || testnet_override;
        Self { code, testnet, explicit }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn testnet(&self) -> bool {
        self.testnet
    }

    /// True when the network came from the request rather than the default
    #[must_use]
    pub fn explicit(&self) -> bool {
        self.explicit
    }
}
