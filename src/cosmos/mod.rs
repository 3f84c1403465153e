//! Cosmos DB REST transport.
//!
//! Implements the small slice of the service this tool needs: database and
//! container provisioning, create-only item writes, point reads, and paged
//! queries, all with per-request master-key signing and request-charge
//! accounting.

mod auth;
mod client;

pub use client::{CosmosClient, CosmosContainer};

use crate::error::{Result, RubenchError};

/// Parsed `AccountEndpoint=...;AccountKey=...;` connection string.
#[derive(Debug, Clone)]
pub struct ConnectionString {
    pub endpoint: String,
    pub key: String,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut key = None;
        for part in raw.split(';') {
            // Account keys are base64 and end in '=' padding, so only the
            // first '=' separates name from value.
            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            match name.trim() {
                "AccountEndpoint" => endpoint = Some(value.trim().to_string()),
                "AccountKey" => key = Some(value.trim().to_string()),
                _ => {}
            }
        }
        match (endpoint, key) {
            (Some(endpoint), Some(key)) if !endpoint.is_empty() && !key.is_empty() => {
                Ok(ConnectionString {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    key,
                })
            }
            _ => Err(RubenchError::Config(
                "connection string must contain AccountEndpoint and AccountKey".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_endpoint_and_key() {
        let cs = ConnectionString::parse(
            "AccountEndpoint=https://acct.documents.azure.com:443/;AccountKey=Zm9vYmFyYmF6cXV4PT0=;",
        )
        .unwrap();
        assert_eq!(cs.endpoint, "https://acct.documents.azure.com:443");
        assert_eq!(cs.key, "Zm9vYmFyYmF6cXV4PT0=");
    }

    #[test]
    fn rejects_missing_key() {
        let err = ConnectionString::parse("AccountEndpoint=https://acct.documents.azure.com/");
        assert!(matches!(err, Err(RubenchError::Config(_))));
    }

    #[test]
    fn key_padding_survives() {
        let cs =
            ConnectionString::parse("AccountKey=abc==;AccountEndpoint=https://x.example").unwrap();
        assert_eq!(cs.key, "abc==");
    }
}
