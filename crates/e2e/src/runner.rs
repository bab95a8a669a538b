//! Test runner that selects scenarios, drives them and reports the outcome

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::browser::DriverFactory;
use crate::config::E2eConfig;
use crate::error::E2eResult;
use crate::page::{ChargePointPage, WaitPolicy};
use crate::scenarios::{catalogue, Scenario, ScenarioContext, Suite};

/// Which scenarios to run. Empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub suites: Vec<Suite>,
    pub tags: Vec<String>,
    pub names: Vec<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn suite(suite: Suite) -> Self {
        Self {
            suites: vec![suite],
            ..Self::default()
        }
    }

    pub fn matches(&self, scenario: &Scenario) -> bool {
        (self.suites.is_empty() || self.suites.contains(&scenario.suite))
            && (self.tags.is_empty() || self.tags.iter().any(|t| scenario.has_tag(t)))
            && (self.names.is_empty() || self.names.iter().any(|n| n == scenario.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub suite: Suite,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn result(&self, name: &str) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: E2eConfig,
    api: ApiClient,
    drivers: Option<Arc<dyn DriverFactory>>,
    scenarios: Vec<Scenario>,
}

impl TestRunner {
    /// Runner over the full catalogue. Without a driver factory, UI and
    /// combo scenarios are reported as skipped.
    pub fn new(config: E2eConfig) -> E2eResult<Self> {
        let api = ApiClient::new(&config.api_base_url, config.timeouts.request)?;
        Ok(Self {
            config,
            api,
            drivers: None,
            scenarios: catalogue(),
        })
    }

    pub fn with_drivers(mut self, drivers: Arc<dyn DriverFactory>) -> Self {
        self.drivers = Some(drivers);
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn selected(&self, selection: &Selection) -> Vec<&Scenario> {
        self.scenarios.iter().filter(|s| selection.matches(s)).collect()
    }

    /// Run every selected scenario in catalogue order
    pub async fn run(&self, selection: &Selection) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let selected = self.selected(selection);

        info!("Running {} scenario(s)...", selected.len());

        let mut results = Vec::with_capacity(selected.len());
        for scenario in selected {
            let result = self.run_scenario(scenario).await;
            match result.status {
                ScenarioStatus::Passed => info!("✓ {} ({} ms)", result.name, result.duration_ms),
                ScenarioStatus::Failed => error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
                ScenarioStatus::Skipped => warn!("- {} (skipped: no browser)", result.name),
            }
            results.push(result);
        }

        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        let passed = count(ScenarioStatus::Passed);
        let failed = count(ScenarioStatus::Failed);
        let skipped = count(ScenarioStatus::Skipped);
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        SuiteReport {
            total: results.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            started_at,
            results,
        }
    }

    /// Run one scenario. UI scenarios get a fresh page that is navigated
    /// first and closed afterwards, whatever the outcome.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let outcome = if scenario.suite.needs_browser() {
            match &self.drivers {
                Some(drivers) => Some(self.run_with_page(scenario, drivers.as_ref()).await),
                None => None,
            }
        } else {
            let ctx = ScenarioContext::new(self.api.clone(), None);
            Some(scenario.run(&ctx).await)
        };

        let (status, error) = match outcome {
            Some(Ok(())) => (ScenarioStatus::Passed, None),
            Some(Err(e)) => (ScenarioStatus::Failed, Some(e.to_string())),
            None => (ScenarioStatus::Skipped, None),
        };

        ScenarioResult {
            name: scenario.name.to_string(),
            suite: scenario.suite,
            status,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
        }
    }

    async fn run_with_page(
        &self,
        scenario: &Scenario,
        drivers: &dyn DriverFactory,
    ) -> E2eResult<()> {
        let driver = drivers.open().await?;
        let page = ChargePointPage::new(driver, self.config.ui_base_url.as_str())
            .with_wait(WaitPolicy::from(self.config.timeouts));
        let navigated = page.navigate().await;
        let mut ctx = ScenarioContext::new(self.api.clone(), Some(page));

        let outcome = match navigated {
            Ok(()) => scenario.run(&ctx).await,
            Err(e) => Err(e),
        };

        if let Some(page) = ctx.take_page() {
            if let Err(e) = page.close().await {
                warn!("Closing page after {} failed: {}", scenario.name, e);
            }
        }

        outcome
    }

    /// Write the report as `test-results.json` under `output_dir`
    pub fn write_report(&self, report: &SuiteReport, output_dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
