use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::container::{DocumentContainer, PointRead, QueryPage, WriteOutcome};
use crate::cosmos::auth::{request_date, MasterKey};
use crate::cosmos::ConnectionString;
use crate::error::{Result, RubenchError};

const API_VERSION: &str = "2018-12-31";
const CHARGE_HEADER: &str = "x-ms-request-charge";
const CONTINUATION_HEADER: &str = "x-ms-continuation";
const PARTITION_KEY_HEADER: &str = "x-ms-documentdb-partitionkey";

/// Account-level client: provisioning plus a handle factory for containers.
#[derive(Clone)]
pub struct CosmosClient {
    http: reqwest::Client,
    endpoint: String,
    key: MasterKey,
}

impl CosmosClient {
    pub fn new(connection: &ConnectionString) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(64)
            .build()?;
        Ok(CosmosClient {
            http,
            endpoint: connection.endpoint.clone(),
            key: MasterKey::from_base64(&connection.key)?,
        })
    }

    fn signed(
        &self,
        verb: Method,
        resource_type: &str,
        resource_link: &str,
        url: String,
    ) -> RequestBuilder {
        let date = request_date();
        let token = self
            .key
            .authorization(verb.as_str(), resource_type, resource_link, &date);
        self.http
            .request(verb, url)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header(AUTHORIZATION, token)
    }

    /// `POST /dbs`, treating an already-exists conflict as success.
    #[instrument(skip(self))]
    pub async fn create_database_if_not_exists(&self, database: &str) -> Result<()> {
        let response = self
            .signed(Method::POST, "dbs", "", format!("{}/dbs", self.endpoint))
            .json(&json!({ "id": database }))
            .send()
            .await?;
        match response.status() {
            StatusCode::CREATED | StatusCode::OK => {
                debug!(database, "database created");
                Ok(())
            }
            StatusCode::CONFLICT => {
                debug!(database, "database already exists");
                Ok(())
            }
            _ => Err(unexpected(response).await),
        }
    }

    /// `POST /dbs/{db}/colls` with a hash partition key, conflict tolerated.
    #[instrument(skip(self))]
    pub async fn create_container_if_not_exists(
        &self,
        database: &str,
        container: &str,
        partition_key_path: &str,
    ) -> Result<()> {
        let link = format!("dbs/{database}");
        let response = self
            .signed(
                Method::POST,
                "colls",
                &link,
                format!("{}/{}/colls", self.endpoint, link),
            )
            .json(&json!({
                "id": container,
                "partitionKey": { "paths": [partition_key_path], "kind": "Hash" },
            }))
            .send()
            .await?;
        match response.status() {
            StatusCode::CREATED | StatusCode::OK => {
                debug!(container, "container created");
                Ok(())
            }
            StatusCode::CONFLICT => {
                debug!(container, "container already exists");
                Ok(())
            }
            _ => Err(unexpected(response).await),
        }
    }

    /// Delete a container, tolerating absence so cleanup is idempotent.
    #[instrument(skip(self))]
    pub async fn delete_container(&self, database: &str, container: &str) -> Result<()> {
        let link = format!("dbs/{database}/colls/{container}");
        let response = self
            .signed(
                Method::DELETE,
                "colls",
                &link,
                format!("{}/{}", self.endpoint, link),
            )
            .send()
            .await?;
        match response.status() {
            StatusCode::NO_CONTENT => {
                debug!(container, "container deleted");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!(container, "container absent, nothing to delete");
                Ok(())
            }
            _ => Err(unexpected(response).await),
        }
    }

    /// Handle for item-level operations against one container.
    pub fn container(&self, database: &str, container: &str) -> CosmosContainer {
        CosmosContainer {
            http: self.http.clone(),
            endpoint: self.endpoint.clone(),
            key: self.key.clone(),
            link: format!("dbs/{database}/colls/{container}"),
        }
    }
}

/// Item-level client for one container, implementing [`DocumentContainer`].
#[derive(Clone)]
pub struct CosmosContainer {
    http: reqwest::Client,
    endpoint: String,
    key: MasterKey,
    link: String,
}

impl CosmosContainer {
    fn signed(
        &self,
        verb: Method,
        resource_link: &str,
        url: String,
    ) -> RequestBuilder {
        let date = request_date();
        let token = self
            .key
            .authorization(verb.as_str(), "docs", resource_link, &date);
        self.http
            .request(verb, url)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION)
            .header(AUTHORIZATION, token)
    }

    fn partition_key_header(partition_key: &str) -> Result<String> {
        // The header is a JSON array of key components.
        Ok(serde_json::to_string(&[partition_key])?)
    }
}

#[derive(Deserialize)]
struct QueryBody {
    #[serde(rename = "Documents", default)]
    documents: Vec<Value>,
}

#[async_trait]
impl DocumentContainer for CosmosContainer {
    #[instrument(skip(self, body), fields(container = %self.link))]
    async fn create_item(&self, body: &Value, partition_key: &str) -> Result<WriteOutcome> {
        let start = Instant::now();
        let response = self
            .signed(
                Method::POST,
                &self.link,
                format!("{}/{}/docs", self.endpoint, self.link),
            )
            .header(PARTITION_KEY_HEADER, Self::partition_key_header(partition_key)?)
            .json(body)
            .send()
            .await?;
        match response.status() {
            StatusCode::CREATED => {
                let charge = request_charge(response.headers())?;
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    charge, "create item"
                );
                Ok(WriteOutcome::Created { charge })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "create item throttled"
                );
                Ok(WriteOutcome::Throttled)
            }
            _ => Err(unexpected(response).await),
        }
    }

    #[instrument(skip(self), fields(container = %self.link))]
    async fn read_item(&self, id: &str, partition_key: &str) -> Result<Option<PointRead>> {
        let start = Instant::now();
        let link = format!("{}/docs/{id}", self.link);
        let response = self
            .signed(Method::GET, &link, format!("{}/{}", self.endpoint, link))
            .header(PARTITION_KEY_HEADER, Self::partition_key_header(partition_key)?)
            .send()
            .await?;
        match response.status() {
            StatusCode::OK => {
                let charge = request_charge(response.headers())?;
                let document: Value = response.json().await?;
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    charge, "point read"
                );
                Ok(Some(PointRead { document, charge }))
            }
            StatusCode::NOT_FOUND => {
                debug!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "point read miss"
                );
                Ok(None)
            }
            _ => Err(unexpected(response).await),
        }
    }

    #[instrument(skip(self, query), fields(container = %self.link))]
    async fn query_page(&self, query: &str, continuation: Option<&str>) -> Result<QueryPage> {
        let start = Instant::now();
        let mut request = self
            .signed(
                Method::POST,
                &self.link,
                format!("{}/{}/docs", self.endpoint, self.link),
            )
            .header(CONTENT_TYPE, "application/query+json")
            .header("x-ms-documentdb-isquery", "true")
            .header("x-ms-documentdb-query-enablecrosspartition", "true")
            .body(serde_json::to_string(&json!({
                "query": query,
                "parameters": [],
            }))?);
        if let Some(token) = continuation {
            request = request.header(CONTINUATION_HEADER, token);
        }
        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected(response).await);
        }

        let charge = request_charge(response.headers())?;
        let continuation = response
            .headers()
            .get(CONTINUATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let body: QueryBody = response.json().await?;
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            charge,
            rows = body.documents.len(),
            more = continuation.is_some(),
            "query page"
        );
        Ok(QueryPage {
            rows: body.documents,
            charge,
            continuation,
        })
    }
}

fn request_charge(headers: &HeaderMap) -> Result<f64> {
    headers
        .get(CHARGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or(RubenchError::MissingCharge)
}

async fn unexpected(response: Response) -> RubenchError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RubenchError::Unexpected { status, body }
}
