//! Charge Point E2E Test Framework
//!
//! This crate drives the charge point installation service from the outside:
//! - Calls the REST endpoints through a thin request helper
//! - Controls a Chromium instance over the DevTools protocol
//! - Wraps the installation form in a page object with polling checks
//! - Runs a catalogue of API, UI and cross-surface scenarios
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── run(selection) -> SuiteReport                        │
//! │    ├── run_scenario(scenario) -> ScenarioResult             │
//! │    └── write_report(report, dir) -> test-results.json       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioContext                                            │
//! │    ├── api: ApiClient           (reqwest)                   │
//! │    └── page: ChargePointPage    (UI scenarios only)         │
//! │          └── PageDriver                                     │
//! │                └── CdpPage      (chromiumoxide)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  E2eConfig                                                  │
//! │    defaults < TOML file < environment < command line        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod page;
pub mod runner;
pub mod scenarios;

pub use api::{ApiClient, ApiResponse};
pub use browser::{CdpBrowser, DriverFactory, ListLayout, ListRow, PageDriver, RowKey};
pub use config::{ConfigSource, E2eConfig, Profile};
pub use error::{E2eError, E2eResult};
pub use page::{ChargePointPage, UiSelectors, WaitPolicy};
pub use runner::{ScenarioResult, ScenarioStatus, Selection, SuiteReport, TestRunner};
pub use scenarios::{catalogue, Scenario, ScenarioContext, Suite};
