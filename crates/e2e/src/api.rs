//! Thin HTTP helper for the charge point REST endpoints
//!
//! Every call returns the raw status and body. Interpreting the status is
//! left to the caller, so scenarios can assert on failures as easily as on
//! successes.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

use chargepoint_common::{ChargePoint, NewChargePoint};

use crate::error::{E2eError, E2eResult};

const CHARGE_POINT_PATH: &str = "charge-point";
const APPLICATION_JSON: &str = "application/json";

/// Status and body of a response, unread by the helper
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Fail with [`E2eError::UnexpectedStatus`] unless the status is `expected`
    pub fn expect_status(&self, operation: &str, expected: u16) -> E2eResult<&Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(E2eError::UnexpectedStatus {
                operation: operation.to_string(),
                expected,
                actual: self.status,
                body: truncate(&self.body, 200),
            })
        }
    }
}

/// Client for the charge point endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &Url, request_timeout: Duration) -> E2eResult<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, CHARGE_POINT_PATH)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, CHARGE_POINT_PATH, urlencoding::encode(id))
    }

    /// `POST /charge-point` with `{serialNumber}` and a JSON content type
    pub async fn add_charge_point(&self, serial_number: &str) -> E2eResult<ApiResponse> {
        let request = self
            .client
            .post(self.collection_url())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(serde_json::to_vec(&NewChargePoint::new(serial_number))?);
        self.send("add charge point", request).await
    }

    /// `POST /charge-point` with an empty JSON object
    pub async fn add_charge_point_without_body(&self) -> E2eResult<ApiResponse> {
        let request = self
            .client
            .post(self.collection_url())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body("{}");
        self.send("add charge point without body", request).await
    }

    /// `POST /charge-point` with a JSON body but no `Content-Type` header
    pub async fn add_charge_point_without_headers(
        &self,
        serial_number: &str,
    ) -> E2eResult<ApiResponse> {
        let request = self
            .client
            .post(self.collection_url())
            .body(serde_json::to_vec(&NewChargePoint::new(serial_number))?);
        self.send("add charge point without headers", request).await
    }

    /// `DELETE /charge-point/{id}`
    pub async fn delete_charge_point(&self, id: &str) -> E2eResult<ApiResponse> {
        let request = self
            .client
            .delete(self.item_url(id))
            .header(CONTENT_TYPE, APPLICATION_JSON);
        self.send("delete charge point", request).await
    }

    /// `GET /charge-point`
    pub async fn get_all_charge_points(&self) -> E2eResult<ApiResponse> {
        let request = self
            .client
            .get(self.collection_url())
            .header(ACCEPT, APPLICATION_JSON);
        self.send("list charge points", request).await
    }

    /// List and decode, failing on anything other than 200
    pub async fn list_charge_points(&self) -> E2eResult<Vec<ChargePoint>> {
        let response = self.get_all_charge_points().await?;
        response.expect_status("list charge points", 200)?;
        response.json()
    }

    /// Poll the list endpoint until the service answers with any status
    pub async fn wait_until_reachable(&self, timeout: Duration) -> E2eResult<()> {
        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;
            match self.client.get(self.collection_url()).send().await {
                Ok(resp) => {
                    info!("API reachable at {} (HTTP {})", self.base_url, resp.status().as_u16());
                    return Ok(());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for API at {}...", self.base_url);
                    }
                    debug!("Reachability check failed: {}", e);
                }
            }
            sleep(Duration::from_millis(200)).await;
        }

        Err(E2eError::Timeout {
            what: format!("API at {} ({} attempts)", self.base_url, attempts),
            elapsed: start.elapsed(),
        })
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> E2eResult<ApiResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("{} -> HTTP {}", operation, status);
        Ok(ApiResponse { status, body })
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&Url::parse(base).unwrap(), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_urls_without_double_slash() {
        let api = client("http://localhost:3001/");
        assert_eq!(api.collection_url(), "http://localhost:3001/charge-point");
        assert_eq!(api.item_url("abc"), "http://localhost:3001/charge-point/abc");
    }

    #[test]
    fn test_base_path_is_kept() {
        let api = client("https://example.com/api/v1");
        assert_eq!(api.collection_url(), "https://example.com/api/v1/charge-point");
    }

    #[test_case("", "http://localhost:3001/charge-point/" ; "empty id keeps the trailing slash")]
    #[test_case("42", "http://localhost:3001/charge-point/42" ; "numeric id")]
    #[test_case("a/b c", "http://localhost:3001/charge-point/a%2Fb%20c" ; "reserved characters")]
    #[test_case("SN-AB12CD34", "http://localhost:3001/charge-point/SN-AB12CD34" ; "serial as id")]
    fn test_item_url_encodes_id(id: &str, expected: &str) {
        assert_eq!(client("http://localhost:3001").item_url(id), expected);
    }

    #[test]
    fn test_expect_status() {
        let response = ApiResponse::new(400, "{\"error\":\"duplicate\"}");
        assert!(response.expect_status("add", 400).is_ok());

        match response.expect_status("add", 201) {
            Err(E2eError::UnexpectedStatus { expected, actual, body, .. }) => {
                assert_eq!(expected, 201);
                assert_eq!(actual, 400);
                assert!(body.contains("duplicate"));
            }
            other => panic!("expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé…");
    }
}
