//! Page object for the charge point installation form
//!
//! Scenarios call named operations here instead of touching selectors.
//! Checks poll the page until they hold or the [`WaitPolicy`] runs out, so a
//! UI that updates asynchronously after a click does not make them flaky.
//!
//! Entries are matched by their exact, trimmed text. When the markup exposes
//! a system-assigned id (see [`UiSelectors::id_attribute`]) deletion keys off
//! that id; otherwise it falls back to the entry's position. More than one
//! matching entry is reported as [`E2eError::AmbiguousRow`] rather than
//! acting on the first one.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{ListLayout, ListRow, PageDriver, RowKey};
use crate::config::Timeouts;
use crate::error::{E2eError, E2eResult};

/// Extra delete clicks allowed on top of one per entry
pub const DELETE_RETRIES: usize = 3;

/// Selectors of the installation form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSelectors {
    pub serial_input: String,
    pub add_button: String,
    pub list_text: String,
    pub delete_button: String,
    pub id_attribute: String,
}

impl Default for UiSelectors {
    fn default() -> Self {
        Self {
            serial_input: "input[name='input-serial-number']".to_string(),
            add_button: "button.addButton".to_string(),
            list_text: ".list-text".to_string(),
            delete_button: ".list-button".to_string(),
            id_attribute: "data-id".to_string(),
        }
    }
}

impl UiSelectors {
    pub fn list_layout(&self) -> ListLayout {
        ListLayout {
            item_selector: self.list_text.clone(),
            action_selector: self.delete_button.clone(),
            id_attribute: self.id_attribute.clone(),
        }
    }
}

/// How long and how often to re-check the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::from(Timeouts::default())
    }
}

impl From<Timeouts> for WaitPolicy {
    fn from(timeouts: Timeouts) -> Self {
        Self {
            timeout: timeouts.ui,
            poll_interval: timeouts.poll_interval,
        }
    }
}

impl WaitPolicy {
    /// Re-evaluate `check` until it yields `Ok`, or fail with the last
    /// observation (`Err(String)`) once the timeout has passed. Driver errors
    /// abort at once.
    pub async fn poll<T, F, Fut>(&self, what: &str, mut check: F) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Result<T, String>>>,
    {
        let start = Instant::now();
        loop {
            let observed = match check().await? {
                Ok(value) => return Ok(value),
                Err(observed) => observed,
            };
            if start.elapsed() >= self.timeout {
                return Err(E2eError::AssertionFailed(format!(
                    "{} (after {:?}: {})",
                    what,
                    start.elapsed(),
                    observed
                )));
            }
            sleep(self.poll_interval).await;
        }
    }
}

/// The charge point installation form
pub struct ChargePointPage {
    driver: Arc<dyn PageDriver>,
    base_url: String,
    selectors: UiSelectors,
    layout: ListLayout,
    wait: WaitPolicy,
}

impl ChargePointPage {
    pub fn new(driver: Arc<dyn PageDriver>, base_url: impl Into<String>) -> Self {
        Self::with_selectors(driver, base_url, UiSelectors::default(), WaitPolicy::default())
    }

    pub fn with_selectors(
        driver: Arc<dyn PageDriver>,
        base_url: impl Into<String>,
        selectors: UiSelectors,
        wait: WaitPolicy,
    ) -> Self {
        let layout = selectors.list_layout();
        Self {
            driver,
            base_url: base_url.into(),
            selectors,
            layout,
            wait,
        }
    }

    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        info!("Opening {}", self.base_url);
        self.driver.goto(&self.base_url).await
    }

    /// Fill the serial number input and press add. Does not check the outcome.
    pub async fn add_serial_number(&self, serial: &str) -> E2eResult<()> {
        debug!("Adding serial '{}'", preview(serial));
        self.driver.fill(&self.selectors.serial_input, serial).await?;
        self.driver.click(&self.selectors.add_button).await
    }

    /// Press add without touching the input
    pub async fn click_add(&self) -> E2eResult<()> {
        self.driver.click(&self.selectors.add_button).await
    }

    pub async fn clear_input_field(&self) -> E2eResult<()> {
        self.driver.fill(&self.selectors.serial_input, "").await
    }

    /// Wait until exactly one visible entry shows `serial`
    pub async fn verify_serial_in_list(&self, serial: &str) -> E2eResult<()> {
        let what = format!("'{}' should be listed exactly once", preview(serial));
        self.wait
            .poll(&what, || async move {
                let n = self.visible_matches(serial).await?.len();
                Ok::<_, E2eError>(if n == 1 {
                    Ok(())
                } else {
                    Err(format!("{} visible match(es)", n))
                })
            })
            .await
    }

    /// Wait until no entry shows `serial`
    pub async fn verify_serial_not_in_list(&self, serial: &str) -> E2eResult<()> {
        let what = format!("'{}' should not be listed", preview(serial));
        self.wait
            .poll(&what, || async move {
                let n = self.matches(serial).await?.len();
                Ok::<_, E2eError>(if n == 0 {
                    Ok(())
                } else {
                    Err(format!("{} match(es)", n))
                })
            })
            .await
    }

    /// Wait until the add button is disabled
    pub async fn is_add_button_disabled(&self) -> E2eResult<()> {
        self.wait
            .poll("add button should be disabled", || async move {
                let disabled = self.driver.is_disabled(&self.selectors.add_button).await?;
                Ok::<_, E2eError>(if disabled {
                    Ok(())
                } else {
                    Err("button is enabled".to_string())
                })
            })
            .await
    }

    /// Press the delete control of the single entry showing `serial`
    pub async fn delete_serial(&self, serial: &str) -> E2eResult<()> {
        let key = self.resolve_row(serial).await?;
        debug!("Deleting '{}' via {:?}", preview(serial), key);
        self.driver.click_row_action(&self.layout, &key).await
    }

    /// Press the delete control of the entry carrying the system-assigned `id`
    pub async fn delete_row_by_id(&self, id: &str) -> E2eResult<()> {
        let rows = self.driver.rows(&self.layout).await?;
        if !rows.iter().any(|row| row.id.as_deref() == Some(id)) {
            return Err(E2eError::RowNotFound(format!("id {}", id)));
        }
        self.driver.click_row_action(&self.layout, &RowKey::Id(id.to_string())).await
    }

    /// Number of visible entries showing `serial`
    pub async fn get_total_serial_number_count(&self, serial: &str) -> E2eResult<usize> {
        Ok(self.visible_matches(serial).await?.len())
    }

    /// Number of entries in the list
    pub async fn get_serial_entries_count(&self) -> E2eResult<usize> {
        self.driver.count(&self.selectors.list_text).await
    }

    /// Delete entries from the top until the list is empty.
    ///
    /// After each click the list must shrink within the wait timeout before
    /// the next click is issued. A click that has no effect is retried.
    /// Gives up with [`E2eError::DidNotConverge`] once the initial entry
    /// count plus [`DELETE_RETRIES`] clicks have been spent.
    pub async fn delete_all_serial_entries(&self) -> E2eResult<()> {
        let initial = self.get_serial_entries_count().await?;
        let budget = initial + DELETE_RETRIES;
        let mut remaining = initial;
        let mut attempts = 0;

        info!("Deleting all {} entries", initial);

        while remaining > 0 {
            if attempts >= budget {
                return Err(E2eError::DidNotConverge { attempts, remaining });
            }
            attempts += 1;

            self.driver
                .click_row_action(&self.layout, &RowKey::Index(0))
                .await?;

            let before = remaining;
            let shrunk = self
                .wait
                .poll("list should shrink after delete", || async move {
                    let n = self.get_serial_entries_count().await?;
                    Ok::<_, E2eError>(if n < before {
                        Ok(n)
                    } else {
                        Err(format!("{} entries", n))
                    })
                })
                .await;

            remaining = match shrunk {
                Ok(n) => n,
                Err(E2eError::AssertionFailed(reason)) => {
                    warn!("Delete click {} had no effect: {}", attempts, reason);
                    self.get_serial_entries_count().await?
                }
                Err(e) => return Err(e),
            };
        }

        Ok(())
    }

    pub async fn close(&self) -> E2eResult<()> {
        self.driver.close().await
    }

    async fn matches(&self, serial: &str) -> E2eResult<Vec<ListRow>> {
        let rows = self.driver.rows(&self.layout).await?;
        Ok(rows.into_iter().filter(|row| row.text == serial.trim()).collect())
    }

    async fn visible_matches(&self, serial: &str) -> E2eResult<Vec<ListRow>> {
        let mut rows = self.matches(serial).await?;
        rows.retain(|row| row.visible);
        Ok(rows)
    }

    async fn resolve_row(&self, serial: &str) -> E2eResult<RowKey> {
        let mut rows = self.visible_matches(serial).await?;
        match rows.len() {
            0 => Err(E2eError::RowNotFound(serial.to_string())),
            1 => {
                let row = rows.remove(0);
                Ok(match row.id {
                    Some(id) => RowKey::Id(id),
                    None => RowKey::Index(row.index),
                })
            }
            count => Err(E2eError::AmbiguousRow {
                serial: serial.to_string(),
                count,
            }),
        }
    }
}

/// Serial numbers can be 258+ characters; keep log lines readable
fn preview(serial: &str) -> String {
    const MAX: usize = 24;
    if serial.chars().count() <= MAX {
        serial.to_string()
    } else {
        let head: String = serial.chars().take(MAX).collect();
        format!("{}… ({} chars)", head, serial.chars().count())
    }
}
