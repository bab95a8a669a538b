//! Scenario catalogue
//!
//! Each scenario is a named async body run against a [`ScenarioContext`].
//! API scenarios only get the request helper; UI and combo scenarios also
//! get a freshly navigated [`ChargePointPage`].

use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::{E2eError, E2eResult};
use crate::page::ChargePointPage;

mod api;
mod combo;
mod ui;

pub type ScenarioFn = for<'a> fn(&'a ScenarioContext) -> BoxFuture<'a, E2eResult<()>>;

/// Which surface a scenario exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    Api,
    Ui,
    Combo,
}

impl Suite {
    pub fn needs_browser(&self) -> bool {
        matches!(self, Suite::Ui | Suite::Combo)
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Suite::Api => "api",
            Suite::Ui => "ui",
            Suite::Combo => "combo",
        })
    }
}

/// A single named test case
#[derive(Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub suite: Suite,
    pub tags: &'static [&'static str],
    run: ScenarioFn,
}

impl Scenario {
    pub const fn new(
        name: &'static str,
        suite: Suite,
        tags: &'static [&'static str],
        run: ScenarioFn,
    ) -> Self {
        Self { name, suite, tags, run }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }

    pub async fn run(&self, ctx: &ScenarioContext) -> E2eResult<()> {
        (self.run)(ctx).await
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("tags", &self.tags)
            .finish()
    }
}

/// What a scenario body gets to work with
pub struct ScenarioContext {
    pub api: ApiClient,
    page: Option<ChargePointPage>,
}

impl ScenarioContext {
    pub fn new(api: ApiClient, page: Option<ChargePointPage>) -> Self {
        Self { api, page }
    }

    pub fn page(&self) -> E2eResult<&ChargePointPage> {
        self.page.as_ref().ok_or_else(|| {
            E2eError::Config("scenario needs a browser but none is configured".to_string())
        })
    }

    pub(crate) fn take_page(&mut self) -> Option<ChargePointPage> {
        self.page.take()
    }
}

/// Every scenario, API first
pub fn catalogue() -> Vec<Scenario> {
    let mut scenarios = api::scenarios();
    scenarios.extend(ui::scenarios());
    scenarios.extend(combo::scenarios());
    scenarios
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message()))
    }
}
