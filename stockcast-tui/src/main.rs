//! Stockcast: terminal stock dashboard with an additive price forecast.
//!
//! Startup failures (unreadable config, missing catalog) end the program
//! before the terminal switches to raw mode; everything after that is shown
//! inside the dashboard.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use stockcast_core::data::{DataProvider, SymbolCatalog, SyntheticProvider, YahooProvider};
use stockcast_core::forecast::AdditiveForecaster;
use stockcast_core::DashboardInputs;
use stockcast_tui::config::{DashboardConfig, Overrides, ProviderKind, Settings};
use stockcast_tui::worker::{self, WorkerCommand};
use stockcast_tui::{input, logging, ui, AppState};

#[derive(Parser)]
#[command(
    name = "stockcast",
    about = "Stockcast: price charts and a trend + seasonality forecast in the terminal"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to $CONFIG_DIR/stockcast/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbol catalog CSV (columns: symbol, name).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Initial symbol. Defaults to the first catalog entry.
    #[arg(long)]
    symbol: Option<String>,

    /// Start date (YYYY-MM-DD). Defaults to 2023-01-01.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Forecast horizon in days, clamped to 0-365.
    #[arg(long, allow_negative_numbers = true)]
    horizon: Option<i64>,

    /// Offline mode: generate deterministic synthetic prices instead of fetching.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Log file. Defaults to $CONFIG_DIR/stockcast/stockcast.log.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            catalog: self.catalog.clone(),
            symbol: self.symbol.clone(),
            start: self.start,
            end: self.end,
            horizon: self.horizon,
            synthetic: self.synthetic,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init(&log_path)?;

    let config = DashboardConfig::load(cli.config.as_deref()).context("loading config")?;
    let settings = config.resolve(cli.overrides(), Local::now().date_naive());

    let catalog = SymbolCatalog::load(&settings.catalog_path).with_context(|| {
        format!(
            "loading symbol catalog {}",
            settings.catalog_path.display()
        )
    })?;
    let inputs = initial_inputs(&settings, &catalog);
    let provider = build_provider(&settings)?;
    let forecaster = Box::new(AdditiveForecaster::new(settings.forecast.clone()));
    info!(
        symbols = catalog.len(),
        symbol = %inputs.symbol,
        start = %inputs.start,
        end = %inputs.end,
        horizon = inputs.horizon_days,
        "starting dashboard"
    );

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(provider, forecaster, cmd_rx, resp_tx)
        .context("spawning worker thread")?;

    let mut app = AppState::new(catalog, inputs, cmd_tx.clone(), resp_rx);
    app.request_run();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    if worker_handle.join().is_err() {
        warn!("worker thread panicked");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("dashboard closed");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply_response(resp);
        }

        // 50ms poll keeps charts current while the worker runs.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}

fn initial_inputs(settings: &Settings, catalog: &SymbolCatalog) -> DashboardInputs {
    let symbol = match &settings.symbol {
        Some(symbol) => {
            if catalog.position(symbol).is_none() {
                warn!(%symbol, "initial symbol is not in the catalog");
            }
            symbol.clone()
        }
        None => catalog
            .get(0)
            .map(|entry| entry.symbol.clone())
            .unwrap_or_default(),
    };
    DashboardInputs {
        symbol,
        start: settings.start,
        end: settings.end,
        horizon_days: settings.horizon_days,
    }
}

fn build_provider(settings: &Settings) -> Result<Box<dyn DataProvider>> {
    Ok(match settings.provider.kind {
        ProviderKind::Yahoo => Box::new(
            YahooProvider::new(&settings.provider.user_agent)
                .context("building HTTP client")?,
        ),
        ProviderKind::Synthetic => Box::new(SyntheticProvider::new()),
    })
}
