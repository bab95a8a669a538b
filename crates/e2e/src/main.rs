//! E2E runner entry point
//!
//! Exit status: 0 when every selected scenario passed or was skipped,
//! 1 when any failed, 2 when the run could not start.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chargepoint_common::EquivalenceClass;
use chargepoint_e2e::{CdpBrowser, ConfigSource, E2eError, Profile, Selection, Suite, TestRunner};

#[derive(Parser, Debug)]
#[command(name = "chargepoint-e2e")]
#[command(author, version, about = "E2E test runner for the charge point installation service")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "E2E_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the REST API
    #[arg(long)]
    api_base_url: Option<String>,

    /// Base URL of the installation form
    #[arg(long)]
    ui_base_url: Option<String>,

    /// Configuration profile
    #[arg(long, value_enum)]
    profile: Option<Profile>,

    /// Attach to a running browser instead of launching one
    #[arg(long)]
    cdp_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Skip UI and combo scenarios instead of starting a browser
    #[arg(long)]
    no_browser: bool,

    /// Run only these suites
    #[arg(short, long, value_enum)]
    suite: Vec<Suite>,

    /// Run only scenarios carrying one of these tags
    #[arg(short, long)]
    tag: Vec<String>,

    /// Run only these scenarios
    #[arg(short, long)]
    name: Vec<String>,

    /// Print the selected scenarios and exit
    #[arg(long)]
    list: bool,

    /// Print a serial number of the given class (valid, empty, short, long, symbols) and exit
    #[arg(long, value_name = "CLASS")]
    generate: Option<String>,

    /// Wait up to this many seconds for the API before starting
    #[arg(long)]
    wait_for_api: Option<u64>,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config_layer(&self) -> ConfigSource {
        ConfigSource {
            api_base_url: self.api_base_url.clone(),
            ui_base_url: self.ui_base_url.clone(),
            profile: self.profile,
            cdp_url: self.cdp_url.clone(),
            headless: self.headed.then_some(false),
            ..Default::default()
        }
    }

    fn selection(&self) -> Selection {
        Selection {
            suites: self.suite.clone(),
            tags: self.tag.clone(),
            names: self.name.clone(),
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")
        .and_then(|rt| rt.block_on(async_main(args)));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    if let Some(tag) = &args.generate {
        let class: EquivalenceClass = tag.parse().map_err(E2eError::from)?;
        println!("{}", class.generate());
        return Ok(true);
    }

    let file = match &args.config {
        Some(path) => ConfigSource::load(path)?,
        None => ConfigSource::default(),
    };
    let config = file
        .merge(ConfigSource::from_env()?)
        .merge(args.config_layer())
        .resolve()
        .context("invalid configuration")?;

    info!(
        "API: {}  UI: {}  profile: {:?}",
        config.api_base_url, config.ui_base_url, config.profile
    );

    let selection = args.selection();
    let mut runner = TestRunner::new(config.clone())?;

    if args.list {
        for scenario in runner.selected(&selection) {
            println!("{:<36} {:<6} {}", scenario.name, scenario.suite, scenario.tags.join(","));
        }
        return Ok(true);
    }

    if let Some(secs) = args.wait_for_api {
        runner.api().wait_until_reachable(Duration::from_secs(secs)).await?;
    }

    let needs_browser = runner
        .selected(&selection)
        .iter()
        .any(|s| s.suite.needs_browser());

    let browser = if needs_browser && !args.no_browser {
        let browser = Arc::new(
            CdpBrowser::start(&config.browser)
                .await
                .context("failed to start browser")?,
        );
        runner = runner.with_drivers(browser.clone());
        Some(browser)
    } else {
        if needs_browser {
            warn!("Browser disabled, UI and combo scenarios will be skipped");
        }
        None
    };

    let report = runner.run(&selection).await;
    runner.write_report(&report, &args.output)?;

    // Release the runner's handle so the browser can be shut down by value
    drop(runner);
    if let Some(browser) = browser {
        match Arc::try_unwrap(browser) {
            Ok(browser) => browser.shutdown().await?,
            Err(_) => warn!("Browser still in use, leaving it to exit with the process"),
        }
    }

    Ok(report.is_success())
}
