//! KV Token Repository
//!
//! Serves tokens from two address-keyed KV namespaces, one for mainnet-class
//! records and one for testnet-class records. Namespace choice depends only on
//! the resolved testnet flag, never on the network code.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use crate::domain::gateways::TokenRepository;
use crate::domain::models::query::{
    FindTokenQuery, Identifier, IdentifierLookupQuery, ListTokensQuery, LookupResult, TokenListing, TokenPage,
    MAX_LIMIT,
};
use crate::domain::models::token::{normalize, TokenRecord};
use crate::infrastructure::driven_adapters::kv_store::{KeyListOptions, KvStore};
use crate::shared::errors::RepositoryError;

const BACKEND: &str = "kv";

/// Network reported for mainnet records that do not carry one
const MAINNET_FALLBACK_NETWORK: &str = "xcb";

/// Network reported for testnet records that do not carry one
const TESTNET_FALLBACK_NETWORK: &str = "xab";

/// KV implementation of TokenRepository
pub struct KvTokenRepository {
    mainnet: Arc<dyn KvStore>,
    testnet: Arc<dyn KvStore>,
}

impl KvTokenRepository {
    /// Create a new KvTokenRepository
    #[must_use]
    pub fn new(mainnet: Arc<dyn KvStore>, testnet: Arc<dyn KvStore>) -> Self {
        Self { mainnet, testnet }
    }

    fn namespace(&self, testnet: bool) -> &dyn KvStore {
        if testnet {
            self.testnet.as_ref()
        } else {
            self.mainnet.as_ref()
        }
    }
}

fn to_record(key: &str, value: Value) -> Result<TokenRecord, RepositoryError> {
    match value {
        Value::Object(raw) => Ok(normalize(&raw)),
        _ => Err(RepositoryError::Mapping(format!("Value for '{key}' is not a JSON object"))),
    }
}

#[async_trait]
impl TokenRepository for KvTokenRepository {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn find_token(&self, query: &FindTokenQuery) -> Result<Option<TokenRecord>, RepositoryError> {
        let store = self.namespace(query.network.testnet());

        store
            .get_json(&query.address)
            .await?
            .map(|value| {
                to_record(&query.address, value).map_err(|e| {
                    tracing::error!(key = %query.address, error = %e, "Undecodable KV token");
                    e
                })
            })
            .transpose()
    }

    async fn list_tokens(&self, query: &ListTokensQuery) -> Result<TokenPage, RepositoryError> {
        if query.has_secondary_filters() {
            return Err(RepositoryError::unsupported(BACKEND, "category, ticker and address filtering"));
        }

        let store = self.namespace(query.network.testnet());
        let limit = query.limit.clamp(1, MAX_LIMIT);
        let options = KeyListOptions {
            prefix: query.prefix.as_deref().unwrap_or_default().to_lowercase(),
            limit,
            cursor: query.cursor.clone(),
        };

        let page = store.list_keys(&options).await?;

        let items = if query.full {
            // join_all yields results in input order, so records stay in key order
            let values = join_all(page.keys.iter().map(|key| store.get_json(key))).await;
            let records = page
                .keys
                .iter()
                .zip(values)
                .filter_map(|(key, value)| match value {
                    Ok(Some(value)) => to_record(key, value)
                        .map_err(|e| tracing::warn!(key = %key, error = %e, "Dropping undecodable KV token"))
                        .ok(),
                    Ok(None) => None,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Dropping KV token that failed to load");
                        None
                    }
                })
                .collect();
            TokenListing::Records(records)
        } else {
            TokenListing::Keys(page.keys)
        };

        Ok(TokenPage {
            items,
            limit,
            has_next: !page.list_complete,
            next_cursor: page.cursor,
        })
    }

    async fn lookup_identifier(&self, query: &IdentifierLookupQuery) -> Result<LookupResult, RepositoryError> {
        let Identifier::Address(address) = &query.identifier else {
            return Err(RepositoryError::unsupported(BACKEND, "ticker lookup"));
        };

        let mut probes = vec![(false, MAINNET_FALLBACK_NETWORK)];
        if query.include_testnet {
            probes.push((true, TESTNET_FALLBACK_NETWORK));
        }

        let mut networks: Vec<String> = Vec::new();
        for (testnet, fallback) in probes {
            if let Some(value) = self.namespace(testnet).get_json(address).await? {
                let network = value
                    .get("network")
                    .and_then(Value::as_str)
                    .unwrap_or(fallback)
                    .to_string();
                networks.push(network);
            }
        }

        if let Some(wanted) = &query.network {
            networks.retain(|network| network == wanted);
        }

        let amount = networks.len();
        let networks = query.network.is_none().then(|| {
            let mut distinct: Vec<String> = Vec::new();
            for network in networks {
                if !distinct.contains(&network) {
                    distinct.push(network);
                }
            }
            distinct
        });

        Ok(LookupResult { amount, networks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::network::NetworkContext;
    use crate::domain::models::query::SortOrder;
    use crate::infrastructure::driven_adapters::kv_store::{KeyList, MockKvStore};
    use serde_json::json;

    fn listing(network: NetworkContext) -> ListTokensQuery {
        ListTokensQuery {
            network,
            prefix: None,
            categories: vec![],
            tickers: vec![],
            addresses: vec![],
            limit: 1000,
            cursor: None,
            order: SortOrder::Asc,
            full: false,
        }
    }

    fn untouched() -> MockKvStore {
        MockKvStore::new()
    }

    fn repository(mainnet: MockKvStore, testnet: MockKvStore) -> KvTokenRepository {
        KvTokenRepository::new(Arc::new(mainnet), Arc::new(testnet))
    }

    #[tokio::test]
    async fn should_find_token_in_namespace_of_testnet_flag() {
        let mut testnet = MockKvStore::new();
        testnet
            .expect_get_json()
            .withf(|key| key == "ab01")
            .returning(|_| Ok(Some(json!({ "address": "ab01", "network": "xab", "testnet": true }))));

        let repo = repository(untouched(), testnet);
        let token = repo
            .find_token(&FindTokenQuery {
                address: "ab01".to_string(),
                network: NetworkContext::resolve(Some("xab"), false),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(token.network(), Some("xab"));
        assert!(token.testnet());
        assert_eq!(token.get("categories"), Some(&json!([])));
    }

    #[tokio::test]
    async fn should_return_none_for_missing_token() {
        let mut mainnet = MockKvStore::new();
        mainnet.expect_get_json().returning(|_| Ok(None));

        let repo = repository(mainnet, untouched());
        let token = repo
            .find_token(&FindTokenQuery {
                address: "cb404".to_string(),
                network: NetworkContext::resolve(None, false),
            })
            .await
            .unwrap();

        assert!(token.is_none());
    }

    #[tokio::test]
    async fn should_fail_with_mapping_error_for_non_object_value() {
        let mut mainnet = MockKvStore::new();
        mainnet
            .expect_get_json()
            .returning(|_| Ok(Some(json!(["not", "a", "record"]))));

        let repo = repository(mainnet, untouched());
        let result = repo
            .find_token(&FindTokenQuery {
                address: "cb01".to_string(),
                network: NetworkContext::resolve(None, false),
            })
            .await;

        assert!(matches!(result.unwrap_err(), RepositoryError::Mapping(_)));
    }

    #[tokio::test]
    async fn should_list_keys_with_lowercased_prefix_and_store_cursor() {
        let mut mainnet = MockKvStore::new();
        mainnet
            .expect_list_keys()
            .withf(|options| options.prefix == "cb" && options.limit == 2 && options.cursor.is_none())
            .returning(|_| {
                Ok(KeyList {
                    keys: vec!["cb01".to_string(), "cb02".to_string()],
                    list_complete: false,
                    cursor: Some("opaque".to_string()),
                })
            });

        let repo = repository(mainnet, untouched());
        let mut query = listing(NetworkContext::resolve(Some("xcb"), false));
        query.prefix = Some("CB".to_string());
        query.limit = 2;

        let page = repo.list_tokens(&query).await.unwrap();

        assert_eq!(page.items, TokenListing::Keys(vec!["cb01".to_string(), "cb02".to_string()]));
        assert!(page.has_next);
        assert_eq!(page.next_cursor.as_deref(), Some("opaque"));
    }

    #[tokio::test]
    async fn should_clamp_limit_into_range() {
        let mut mainnet = MockKvStore::new();
        mainnet
            .expect_list_keys()
            .withf(|options| options.limit == 1)
            .returning(|_| Ok(KeyList::default()));

        let repo = repository(mainnet, untouched());
        let mut query = listing(NetworkContext::resolve(None, false));
        query.limit = 0;

        let page = repo.list_tokens(&query).await.unwrap();
        assert_eq!(page.limit, 1);
    }

    #[tokio::test]
    async fn should_fetch_full_records_in_key_order_dropping_failures() {
        let mut mainnet = MockKvStore::new();
        mainnet.expect_list_keys().returning(|_| {
            Ok(KeyList {
                keys: vec!["cb01".into(), "cb02".into(), "cb03".into(), "cb04".into()],
                list_complete: true,
                cursor: None,
            })
        });
        mainnet.expect_get_json().returning(|key| match key {
            "cb01" => Ok(Some(json!({ "address": "cb01", "ticker": "AAA" }))),
            "cb02" => Err(RepositoryError::KvApi {
                status: 500,
                key: "cb02".to_string(),
            }),
            "cb03" => Ok(None),
            _ => Ok(Some(json!({ "address": "cb04", "ticker": "DDD", "categories": "oops" }))),
        });

        let repo = repository(mainnet, untouched());
        let mut query = listing(NetworkContext::resolve(None, false));
        query.full = true;

        let page = repo.list_tokens(&query).await.unwrap();

        let TokenListing::Records(records) = page.items else {
            panic!("expected full records");
        };
        let addresses: Vec<_> = records.iter().filter_map(TokenRecord::address).collect();
        assert_eq!(addresses, vec!["cb01", "cb04"]);
        assert_eq!(records[1].get("categories"), Some(&json!([])));
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn should_reject_secondary_filters() {
        let repo = repository(untouched(), untouched());
        let mut query = listing(NetworkContext::resolve(None, false));
        query.tickers = vec!["CTN".to_string()];

        let result = repo.list_tokens(&query).await;

        assert!(matches!(result, Err(RepositoryError::Unsupported { backend: "kv", .. })));
    }

    #[tokio::test]
    async fn should_reject_ticker_lookup_regardless_of_data() {
        let repo = repository(untouched(), untouched());

        let result = repo
            .lookup_identifier(&IdentifierLookupQuery {
                identifier: Identifier::classify("ctn"),
                network: None,
                include_testnet: true,
            })
            .await;

        assert!(matches!(result, Err(RepositoryError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn should_lookup_address_across_namespaces() {
        let address = "cb7173879e9f4b6f6b8d2e9cbbb3b8b1e1a1c3d2";
        let mut mainnet = MockKvStore::new();
        mainnet
            .expect_get_json()
            .returning(|_| Ok(Some(json!({ "network": "xcb" }))));
        let mut testnet = MockKvStore::new();
        testnet.expect_get_json().returning(|_| Ok(Some(json!({}))));

        let repo = repository(mainnet, testnet);
        let result = repo
            .lookup_identifier(&IdentifierLookupQuery {
                identifier: Identifier::classify(address),
                network: None,
                include_testnet: true,
            })
            .await
            .unwrap();

        assert_eq!(result.amount, 2);
        assert_eq!(result.networks, Some(vec!["xcb".to_string(), "xab".to_string()]));
    }

    #[tokio::test]
    async fn should_filter_address_lookup_by_network_and_hide_networks() {
        let address = "cb7173879e9f4b6f6b8d2e9cbbb3b8b1e1a1c3d2";
        let mut mainnet = MockKvStore::new();
        mainnet
            .expect_get_json()
            .returning(|_| Ok(Some(json!({ "network": "xcb" }))));

        let repo = repository(mainnet, untouched());
        let result = repo
            .lookup_identifier(&IdentifierLookupQuery {
                identifier: Identifier::classify(address),
                network: Some("eth".to_string()),
                include_testnet: false,
            })
            .await
            .unwrap();

        assert_eq!(result.amount, 0);
        assert!(result.networks.is_none());
    }
}
