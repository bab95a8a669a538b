//! Shared fixtures for the integration tests
//!
//! `MockBackend` serves the charge point endpoints with the same acceptance
//! rules the suite expects from the real service. `FakeFrontend` stands in
//! for the installation form: it renders the backend's list and forwards
//! add/delete clicks through the API.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use url::Url;
use uuid::Uuid;

use chargepoint_common::{ChargePoint, ChargePointId, SerialRules};
use chargepoint_e2e::{
    ApiClient, ConfigSource, DriverFactory, E2eConfig, E2eError, E2eResult, ListLayout, ListRow,
    PageDriver, RowKey, UiSelectors,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct BackendOptions {
    /// Accept duplicate serial numbers
    pub allow_duplicates: bool,
}

#[derive(Clone)]
struct BackendState {
    charge_points: Arc<Mutex<Vec<ChargePoint>>>,
    rules: SerialRules,
    options: BackendOptions,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    charge_points: Arc<Mutex<Vec<ChargePoint>>>,
    server: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        Self::with_options(BackendOptions::default()).await
    }

    pub async fn with_options(options: BackendOptions) -> Self {
        let charge_points = Arc::new(Mutex::new(Vec::new()));
        let state = BackendState {
            charge_points: charge_points.clone(),
            rules: SerialRules::default(),
            options,
        };

        let app = Router::new()
            .route("/charge-point", get(list_charge_points).post(add_charge_point))
            .route("/charge-point/:id", delete(delete_charge_point))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            charge_points,
            server,
        }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.url(), Duration::from_secs(5)).unwrap()
    }

    pub fn serials(&self) -> Vec<String> {
        self.charge_points
            .lock()
            .unwrap()
            .iter()
            .map(|cp| cp.serial_number.clone())
            .collect()
    }

    /// Suite configuration pointing at this backend
    pub fn config(&self) -> E2eConfig {
        ConfigSource {
            api_base_url: Some(self.url().to_string()),
            ui_base_url: Some("http://frontend.test/".to_string()),
            ui_timeout_ms: Some(1_000),
            poll_interval_ms: Some(10),
            ..Default::default()
        }
        .resolve()
        .unwrap()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

async fn list_charge_points(State(state): State<BackendState>) -> Json<Vec<ChargePoint>> {
    Json(state.charge_points.lock().unwrap().clone())
}

async fn add_charge_point(
    State(state): State<BackendState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !is_json {
        return bad_request("Content-Type must be application/json");
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => return bad_request(e.to_string()),
    };
    let Some(serial) = payload.get("serialNumber").and_then(|v| v.as_str()) else {
        return bad_request("serialNumber is required");
    };
    if let Err(violation) = state.rules.check(serial) {
        return bad_request(violation.to_string());
    }

    let mut charge_points = state.charge_points.lock().unwrap();
    let duplicate = charge_points.iter().any(|cp| cp.serial_number == serial);
    if duplicate && !state.options.allow_duplicates {
        return bad_request("serialNumber already exists");
    }

    let created = ChargePoint {
        id: ChargePointId::new(Uuid::new_v4().to_string()),
        serial_number: serial.to_string(),
    };
    charge_points.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn delete_charge_point(
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> Response {
    if Uuid::parse_str(&id).is_err() {
        return bad_request("id must be a UUID");
    }

    let mut charge_points = state.charge_points.lock().unwrap();
    let before = charge_points.len();
    charge_points.retain(|cp| cp.id.as_str() != id);

    if charge_points.len() < before {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

#[derive(Default)]
struct FormState {
    input: String,
    rows: Vec<ChargePoint>,
    visited: Vec<String>,
}

/// Installation form rendered from the backend's list
pub struct FakeFrontend {
    api: ApiClient,
    selectors: UiSelectors,
    state: Mutex<FormState>,
}

impl FakeFrontend {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            selectors: UiSelectors::default(),
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    async fn refresh(&self) -> E2eResult<()> {
        let rows = self.api.list_charge_points().await?;
        self.state.lock().unwrap().rows = rows;
        Ok(())
    }

    fn expect_selector(&self, selector: &str, known: &str) -> E2eResult<()> {
        if selector == known {
            Ok(())
        } else {
            Err(E2eError::ElementNotFound(selector.to_string()))
        }
    }
}

#[async_trait]
impl PageDriver for FakeFrontend {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.state.lock().unwrap().visited.push(url.to_string());
        self.refresh().await
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.expect_selector(selector, &self.selectors.serial_input)?;
        self.state.lock().unwrap().input = value.to_string();
        Ok(())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.expect_selector(selector, &self.selectors.add_button)?;
        let input = std::mem::take(&mut self.state.lock().unwrap().input);
        if input.trim().is_empty() {
            return Ok(());
        }
        // Rejections are not rendered; the list simply does not change
        self.api.add_charge_point(&input).await?;
        self.refresh().await
    }

    async fn is_disabled(&self, selector: &str) -> E2eResult<bool> {
        self.expect_selector(selector, &self.selectors.add_button)?;
        Ok(self.state.lock().unwrap().input.trim().is_empty())
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        self.expect_selector(selector, &self.selectors.list_text)?;
        Ok(self.state.lock().unwrap().rows.len())
    }

    async fn rows(&self, layout: &ListLayout) -> E2eResult<Vec<ListRow>> {
        self.expect_selector(&layout.item_selector, &self.selectors.list_text)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .rows
            .iter()
            .enumerate()
            .map(|(index, cp)| ListRow {
                index,
                text: cp.serial_number.clone(),
                id: Some(cp.id.to_string()),
                visible: true,
            })
            .collect())
    }

    async fn click_row_action(&self, layout: &ListLayout, key: &RowKey) -> E2eResult<()> {
        self.expect_selector(&layout.action_selector, &self.selectors.delete_button)?;
        let id = {
            let state = self.state.lock().unwrap();
            let row = match key {
                RowKey::Id(id) => state.rows.iter().find(|cp| cp.id.as_str() == id),
                RowKey::Index(index) => state.rows.get(*index),
            };
            row.map(|cp| cp.id.to_string())
                .ok_or_else(|| E2eError::ElementNotFound(format!("row {:?}", key)))?
        };
        self.api.delete_charge_point(&id).await?;
        self.refresh().await
    }

    async fn close(&self) -> E2eResult<()> {
        Ok(())
    }
}

/// Opens a `FakeFrontend` per scenario
pub struct FakeFrontendFactory {
    api: ApiClient,
}

impl FakeFrontendFactory {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DriverFactory for FakeFrontendFactory {
    async fn open(&self) -> E2eResult<Arc<dyn PageDriver>> {
        Ok(Arc::new(FakeFrontend::new(self.api.clone())))
    }
}
