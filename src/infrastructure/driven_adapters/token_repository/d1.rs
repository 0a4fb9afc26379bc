//! D1 Token Repository
//!
//! Implements TokenRepository over the relational `tokens` table using SQLx
//! with the SQLite dialect. Every query starts from the visibility predicate
//! and narrows it with typed fragments from the query builder.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use super::query_builder::{Column, Comparison, Expr, Predicate, SqlValue, TokenQueryBuilder, WhereClause};
use crate::domain::gateways::TokenRepository;
use crate::domain::models::query::{
    FindTokenQuery, Identifier, IdentifierLookupQuery, ListTokensQuery, LookupResult, TokenListing, TokenPage,
    MAX_LIMIT,
};
use crate::domain::models::token::{normalize, RawTokenRecord, TokenRecord};
use crate::shared::errors::RepositoryError;

const BACKEND: &str = "d1";

const TOKEN_COLUMNS: &str = "blockchain, network, chain_id, testnet, genesis, expiration, address, ticker, name, \
     symbol, alt_symbol, flag, type, decimals, alt_counting, total_supply, categories, url, logos";

/// Bind every value of a rendered WHERE clause, in placeholder order
macro_rules! bind_where {
    ($query:expr, $clause:expr) => {{
        let mut query = $query;
        for value in &$clause.binds {
            query = match value {
                SqlValue::Text(text) => query.bind(text.as_str()),
                SqlValue::Integer(int) => query.bind(*int),
            };
        }
        query
    }};
}

/// Database row representation for the tokens table
#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    blockchain: Option<String>,
    network: Option<String>,
    chain_id: Option<i64>,
    testnet: Option<bool>,
    genesis: Option<String>,
    expiration: Option<String>,
    address: Option<String>,
    ticker: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    alt_symbol: Option<String>,
    flag: Option<String>,
    #[sqlx(rename = "type")]
    token_type: Option<String>,
    decimals: Option<i64>,
    alt_counting: Option<bool>,
    total_supply: Option<String>,
    categories: Option<String>,
    url: Option<String>,
    logos: Option<String>,
}

impl TokenRow {
    /// Map columns onto record field names; NULL columns are left out.
    /// `categories`/`logos` stay as JSON text and are decoded by the normalizer.
    fn into_raw(self) -> RawTokenRecord {
        let fields: [(&str, Option<Value>); 19] = [
            ("blockchain", self.blockchain.map(Value::from)),
            ("network", self.network.map(Value::from)),
            ("chainId", self.chain_id.map(Value::from)),
            ("testnet", self.testnet.map(Value::from)),
            ("genesis", self.genesis.map(Value::from)),
            ("expiration", self.expiration.map(Value::from)),
            ("address", self.address.map(Value::from)),
            ("ticker", self.ticker.map(Value::from)),
            ("name", self.name.map(Value::from)),
            ("symbol", self.symbol.map(Value::from)),
            ("altSymbol", self.alt_symbol.map(Value::from)),
            ("flag", self.flag.map(Value::from)),
            ("type", self.token_type.map(Value::from)),
            ("decimals", self.decimals.map(Value::from)),
            ("altCounting", self.alt_counting.map(Value::from)),
            ("totalSupply", self.total_supply.map(Value::from)),
            ("categories", self.categories.map(Value::from)),
            ("url", self.url.map(Value::from)),
            ("logos", self.logos.map(Value::from)),
        ];

        fields
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
            .collect()
    }

    fn into_record(self) -> TokenRecord {
        normalize(&self.into_raw())
    }
}

/// Largest offset a cursor may carry; one more page past it still fits in `i64`
const MAX_OFFSET: i64 = i64::MAX - MAX_LIMIT as i64;

/// Parse an offset cursor; anything that is not an integer in `0..=MAX_OFFSET` restarts at 0
fn parse_offset(cursor: Option<&str>) -> i64 {
    cursor
        .and_then(|c| c.trim().parse::<i64>().ok())
        .filter(|offset| (0..=MAX_OFFSET).contains(offset))
        .unwrap_or(0)
}

/// SQLite implementation of TokenRepository
pub struct D1TokenRepository {
    pool: SqlitePool,
}

impl D1TokenRepository {
    /// Create a new D1TokenRepository
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count(&self, clause: &WhereClause) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM tokens WHERE {}", clause.sql);
        bind_where!(sqlx::query_scalar::<_, i64>(&sql), clause)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(query = %sql, error = %e, "Token count query failed");
                RepositoryError::Database(e)
            })
    }
}

fn listing_builder(query: &ListTokensQuery) -> TokenQueryBuilder {
    let mut builder = TokenQueryBuilder::visible_at(Utc::now());

    if query.network.explicit() {
        builder = builder.filter(Predicate::eq(Column::Network, query.network.code()));
    }
    builder = builder.filter(Predicate::eq(Column::Testnet, query.network.testnet()));

    if let Some(prefix) = query.prefix.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.filter(Predicate::StartsWith {
            column: Column::Address,
            prefix: prefix.to_lowercase(),
        });
    }
    if !query.categories.is_empty() {
        builder = builder.filter(Predicate::JsonArrayContainsAny {
            column: Column::Categories,
            values: query.categories.iter().map(|c| SqlValue::from(c.as_str())).collect(),
        });
    }
    if !query.tickers.is_empty() {
        builder = builder.filter(Predicate::InList {
            expr: Expr::Upper(Column::Ticker),
            values: query.tickers.iter().map(|t| SqlValue::from(t.to_uppercase())).collect(),
        });
    }
    if !query.addresses.is_empty() {
        builder = builder.filter(Predicate::InList {
            expr: Expr::Col(Column::Address),
            values: query.addresses.iter().map(|a| SqlValue::from(a.as_str())).collect(),
        });
    }

    builder
}

#[async_trait]
impl TokenRepository for D1TokenRepository {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn find_token(&self, query: &FindTokenQuery) -> Result<Option<TokenRecord>, RepositoryError> {
        let mut builder =
            TokenQueryBuilder::visible_at(Utc::now()).filter(Predicate::eq(Column::Address, query.address.as_str()));

        if query.network.explicit() {
            builder = builder
                .filter(Predicate::eq(Column::Network, query.network.code()))
                .filter(Predicate::eq(Column::Testnet, query.network.testnet()));
        }

        let clause = builder.build();
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE {} ORDER BY testnet ASC, network ASC LIMIT 1",
            clause.sql
        );

        let row = bind_where!(sqlx::query_as::<_, TokenRow>(&sql), clause)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(address = %query.address, error = %e, "Token lookup query failed");
                RepositoryError::Database(e)
            })?;

        Ok(row.map(TokenRow::into_record))
    }

    async fn list_tokens(&self, query: &ListTokensQuery) -> Result<TokenPage, RepositoryError> {
        let limit = query.limit.clamp(1, MAX_LIMIT);
        let offset = parse_offset(query.cursor.as_deref());
        let clause = listing_builder(query).build();

        let total = self.count(&clause).await?;

        let direction = query.order.as_sql();
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens WHERE {} \
             ORDER BY ticker {direction}, network {direction}, address {direction} LIMIT ? OFFSET ?",
            clause.sql
        );

        let rows = bind_where!(sqlx::query_as::<_, TokenRow>(&sql), clause)
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(query = %sql, offset, error = %e, "Token page query failed");
                RepositoryError::Database(e)
            })?;

        tracing::debug!(total, offset, returned = rows.len(), "Token page loaded");

        let next_offset = offset.saturating_add(i64::from(limit));
        let has_next = next_offset < total;

        let items = if query.full {
            TokenListing::Records(rows.into_iter().map(TokenRow::into_record).collect())
        } else {
            TokenListing::Keys(rows.into_iter().filter_map(|row| row.address).collect())
        };

        Ok(TokenPage {
            items,
            limit,
            has_next,
            next_cursor: has_next.then(|| next_offset.to_string()),
        })
    }

    async fn lookup_identifier(&self, query: &IdentifierLookupQuery) -> Result<LookupResult, RepositoryError> {
        let mut builder = TokenQueryBuilder::visible_at(Utc::now());

        if !query.include_testnet {
            builder = builder.filter(Predicate::eq(Column::Testnet, false));
        }

        builder = match &query.identifier {
            Identifier::Address(address) => builder.filter(Predicate::eq(Column::Address, address.as_str())),
            Identifier::Ticker(ticker) => builder.filter(Predicate::Compare {
                expr: Expr::Upper(Column::Ticker),
                op: Comparison::Eq,
                value: SqlValue::from(ticker.to_uppercase()),
            }),
        };

        if let Some(network) = &query.network {
            builder = builder.filter(Predicate::eq(Column::Network, network.as_str()));
        }

        let clause = builder.build();
        let sql = format!("SELECT network FROM tokens WHERE {} ORDER BY network ASC", clause.sql);

        let networks: Vec<Option<String>> = bind_where!(sqlx::query_scalar::<_, Option<String>>(&sql), clause)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(identifier = %query.identifier, error = %e, "Identifier lookup query failed");
                RepositoryError::Database(e)
            })?;

        let amount = networks.len();
        let networks = query.network.is_none().then(|| {
            let mut distinct: Vec<String> = networks.into_iter().flatten().collect();
            distinct.dedup();
            distinct
        });

        Ok(LookupResult { amount, networks })
    }
}
