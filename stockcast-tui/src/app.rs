//! Application state: controls, loaded results, status and overlays.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};

use chrono::{Months, NaiveDate, NaiveDateTime};
use tracing::debug;

use stockcast_core::data::{ProviderError, SymbolCatalog};
use stockcast_core::domain::{Forecast, PriceBar, PriceHistory};
use stockcast_core::pipeline::clamp_horizon;
use stockcast_core::{DashboardInputs, ForecastStage};

use crate::view::ViewWindow;
use crate::worker::{WorkerCommand, WorkerResponse};

/// Entries kept in the error history overlay.
pub const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Overview,
    Price,
    Candles,
    Forecast,
    Data,
    Help,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Overview,
        Panel::Price,
        Panel::Candles,
        Panel::Forecast,
        Panel::Data,
        Panel::Help,
    ];

    pub fn index(self) -> usize {
        match self {
            Panel::Overview => 0,
            Panel::Price => 1,
            Panel::Candles => 2,
            Panel::Forecast => 3,
            Panel::Data => 4,
            Panel::Help => 5,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Overview => "Overview",
            Panel::Price => "Price",
            Panel::Candles => "Candles",
            Panel::Forecast => "Forecast",
            Panel::Data => "Data",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Panel {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The four controls in the controls bar, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Symbol,
    Start,
    End,
    Horizon,
}

impl Control {
    pub const ALL: [Control; 4] = [Control::Symbol, Control::Start, Control::End, Control::Horizon];

    pub fn label(self) -> &'static str {
        match self {
            Control::Symbol => "Symbol",
            Control::Start => "Start",
            Control::End => "End",
            Control::Horizon => "Horizon",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn next(self) -> Control {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Control {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Which end of the date range is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

impl DateField {
    pub fn label(self) -> &'static str {
        match self {
            DateField::Start => "Start date",
            DateField::End => "End date",
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// A recorded error for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Model,
    Worker,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Model => "MODEL",
            ErrorCategory::Worker => "WRK",
        }
    }

    pub fn for_provider(err: &ProviderError) -> Self {
        match err {
            ProviderError::NetworkUnreachable(_)
            | ProviderError::RateLimited
            | ProviderError::Http { .. } => ErrorCategory::Network,
            ProviderError::ResponseFormatChanged(_)
            | ProviderError::SymbolNotFound { .. }
            | ProviderError::Normalization(_) => ErrorCategory::Data,
        }
    }
}

/// Modal overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    ErrorHistory,
    SymbolPicker,
    DateEdit(DateField),
}

/// Where the current run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching,
    Fitting,
}

/// Filterable symbol list behind the symbol selector.
#[derive(Debug, Clone, Default)]
pub struct SymbolPicker {
    pub query: String,
    /// Catalog positions matching `query`.
    pub matches: Vec<usize>,
    /// Index into `matches`.
    pub cursor: usize,
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    pub catalog: SymbolCatalog,
    pub inputs: DashboardInputs,
    pub focus: Control,

    /// Bumped on every run request; responses from older runs are dropped.
    pub generation: u64,
    pub phase: RunPhase,
    pub history: Option<PriceHistory>,
    pub history_error: Option<String>,
    pub forecast: Option<ForecastStage>,
    pub view: ViewWindow,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub picker: SymbolPicker,
    pub date_input: String,
}

impl AppState {
    pub fn new(
        catalog: SymbolCatalog,
        inputs: DashboardInputs,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
    ) -> Self {
        Self {
            active_panel: Panel::Overview,
            running: true,
            worker_tx,
            worker_rx,
            catalog,
            inputs,
            focus: Control::Symbol,
            generation: 0,
            phase: RunPhase::Idle,
            history: None,
            history_error: None,
            forecast: None,
            view: ViewWindow::default(),
            status_message: None,
            error_history: VecDeque::new(),
            error_scroll: 0,
            overlay: Overlay::None,
            picker: SymbolPicker::default(),
            date_input: String::new(),
        }
    }

    /// Display name for the selected symbol, or the symbol itself when the
    /// catalog does not list it.
    pub fn display_name(&self) -> &str {
        self.catalog
            .display_name(&self.inputs.symbol)
            .unwrap_or(self.inputs.symbol.as_str())
    }

    /// Bars inside the range slider's window.
    pub fn visible_bars(&self) -> &[PriceBar] {
        match &self.history {
            Some(history) => self.view.slice(history.bars()),
            None => &[],
        }
    }

    pub fn current_forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref().and_then(ForecastStage::forecast)
    }

    /// Why the history panes have nothing to draw, if they don't.
    pub fn history_message(&self) -> Option<String> {
        if let Some(err) = &self.history_error {
            return Some(format!("Price history failed: {err}"));
        }
        match &self.history {
            Some(history) if history.is_empty() => {
                Some("No price data in the selected range".to_string())
            }
            Some(_) => None,
            None if self.phase == RunPhase::Fetching => {
                Some("Loading price history...".to_string())
            }
            None => None,
        }
    }

    /// Why the forecast pane has nothing to draw, if it doesn't.
    pub fn forecast_message(&self) -> Option<String> {
        match (&self.forecast, self.phase) {
            (Some(stage), _) => stage.message(),
            (None, RunPhase::Fetching) => Some("Loading price history...".to_string()),
            (None, RunPhase::Fitting) => Some("Fitting forecast...".to_string()),
            (None, RunPhase::Idle) => None,
        }
    }

    /// Send the current inputs to the worker under a fresh generation.
    pub fn request_run(&mut self) {
        self.generation += 1;
        self.phase = RunPhase::Fetching;
        let cmd = WorkerCommand::Run {
            generation: self.generation,
            inputs: self.inputs.clone(),
        };
        if self.worker_tx.send(cmd).is_err() {
            self.phase = RunPhase::Idle;
            self.push_error(
                ErrorCategory::Worker,
                "background worker stopped".to_string(),
                self.inputs.symbol.clone(),
            );
            return;
        }
        self.set_status(format!("Loading {}...", self.inputs.symbol));
    }

    /// Apply a worker response, ignoring any from superseded runs.
    pub fn apply_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::HistoryReady { generation, result } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "dropping stale history");
                    return;
                }
                self.apply_history(result);
            }
            WorkerResponse::ForecastReady { generation, stage } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "dropping stale forecast");
                    return;
                }
                self.apply_forecast(stage);
            }
        }
    }

    fn apply_history(&mut self, result: Result<PriceHistory, ProviderError>) {
        self.forecast = None;
        self.phase = RunPhase::Fitting;
        match result {
            Ok(history) => {
                self.view = ViewWindow::full(history.len());
                self.history_error = None;
                if history.is_empty() {
                    self.set_warning(format!(
                        "No price data for {} between {} and {}",
                        self.inputs.symbol, self.inputs.start, self.inputs.end
                    ));
                } else {
                    self.set_status(format!(
                        "{}: {} bars loaded, fitting forecast...",
                        history.symbol(),
                        history.len()
                    ));
                }
                self.history = Some(history);
            }
            Err(err) => {
                let category = ErrorCategory::for_provider(&err);
                let message = err.to_string();
                self.history = None;
                self.view = ViewWindow::full(0);
                self.history_error = Some(message.clone());
                let context = self.inputs.symbol.clone();
                self.push_error(category, message, context);
            }
        }
    }

    fn apply_forecast(&mut self, stage: ForecastStage) {
        self.phase = RunPhase::Idle;
        match &stage {
            ForecastStage::Ready(forecast) => {
                self.set_status(format!(
                    "{}: {}-day forecast ready",
                    self.inputs.symbol, forecast.horizon_days
                ));
            }
            ForecastStage::Failed(err) => {
                let context = self.inputs.symbol.clone();
                self.push_error(ErrorCategory::Model, err.to_string(), context);
            }
            ForecastStage::NotEnoughData { points } if *points > 0 => {
                if let Some(message) = stage.message() {
                    self.set_warning(message);
                }
            }
            // Already reported with the history.
            ForecastStage::NotEnoughData { .. } | ForecastStage::Blocked => {}
        }
        self.forecast = Some(stage);
    }

    // ── Controls ─────────────────────────────────────────────────────

    /// Select `symbol` and rerun if it changed.
    pub fn select_symbol(&mut self, symbol: &str) {
        if self.inputs.symbol == symbol {
            return;
        }
        self.inputs.symbol = symbol.to_string();
        self.request_run();
    }

    /// Move through the catalog from the current symbol, wrapping at the ends.
    pub fn step_symbol(&mut self, delta: isize) {
        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        let next = match self.catalog.position(&self.inputs.symbol) {
            Some(pos) => (pos as isize + delta).rem_euclid(len as isize) as usize,
            None => 0,
        };
        if let Some(entry) = self.catalog.get(next) {
            let symbol = entry.symbol.clone();
            self.select_symbol(&symbol);
        }
    }

    pub fn set_date(&mut self, field: DateField, date: NaiveDate) {
        let slot = match field {
            DateField::Start => &mut self.inputs.start,
            DateField::End => &mut self.inputs.end,
        };
        if *slot == date {
            return;
        }
        *slot = date;
        self.request_run();
        if self.inputs.start > self.inputs.end {
            self.set_warning("Start date is after end date");
        }
    }

    /// Move a date by whole months.
    pub fn shift_date(&mut self, field: DateField, months: i32) {
        let current = match field {
            DateField::Start => self.inputs.start,
            DateField::End => self.inputs.end,
        };
        let shifted = if months >= 0 {
            current.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            current.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.set_date(field, date);
        }
    }

    pub fn adjust_horizon(&mut self, delta: i64) {
        let horizon = clamp_horizon(i64::from(self.inputs.horizon_days) + delta);
        if horizon != self.inputs.horizon_days {
            self.inputs.horizon_days = horizon;
            self.request_run();
        }
    }

    /// Step the focused control up (`1`) or down (`-1`).
    pub fn adjust_focused(&mut self, direction: i32) {
        match self.focus {
            Control::Symbol => self.step_symbol(direction as isize),
            Control::Start => self.shift_date(DateField::Start, direction),
            Control::End => self.shift_date(DateField::End, direction),
            Control::Horizon => self.adjust_horizon(i64::from(direction) * 5),
        }
    }

    /// Open the editor for the focused control.
    pub fn edit_focused(&mut self) {
        match self.focus {
            Control::Symbol => self.open_symbol_picker(),
            Control::Start => self.open_date_edit(DateField::Start),
            Control::End => self.open_date_edit(DateField::End),
            Control::Horizon => {}
        }
    }

    // ── Symbol picker ────────────────────────────────────────────────

    pub fn open_symbol_picker(&mut self) {
        self.picker = SymbolPicker {
            query: String::new(),
            matches: self.catalog.search(""),
            cursor: self.catalog.position(&self.inputs.symbol).unwrap_or(0),
        };
        self.overlay = Overlay::SymbolPicker;
    }

    pub fn picker_push(&mut self, c: char) {
        self.picker.query.push(c);
        self.refilter_picker();
    }

    pub fn picker_pop(&mut self) {
        self.picker.query.pop();
        self.refilter_picker();
    }

    fn refilter_picker(&mut self) {
        self.picker.matches = self.catalog.search(&self.picker.query);
        self.picker.cursor = 0;
    }

    pub fn picker_move(&mut self, delta: isize) {
        let len = self.picker.matches.len();
        if len == 0 {
            return;
        }
        let cursor = self.picker.cursor as isize + delta;
        self.picker.cursor = cursor.clamp(0, len as isize - 1) as usize;
    }

    pub fn picker_accept(&mut self) {
        let chosen = self
            .picker
            .matches
            .get(self.picker.cursor)
            .and_then(|&pos| self.catalog.get(pos))
            .map(|entry| entry.symbol.clone());
        match chosen {
            Some(symbol) => {
                self.overlay = Overlay::None;
                self.select_symbol(&symbol);
            }
            None => self.set_warning(format!("No symbol matches \"{}\"", self.picker.query)),
        }
    }

    // ── Date editor ──────────────────────────────────────────────────

    pub fn open_date_edit(&mut self, field: DateField) {
        let current = match field {
            DateField::Start => self.inputs.start,
            DateField::End => self.inputs.end,
        };
        self.date_input = current.format("%Y-%m-%d").to_string();
        self.overlay = Overlay::DateEdit(field);
    }

    pub fn date_edit_accept(&mut self, field: DateField) {
        match NaiveDate::parse_from_str(self.date_input.trim(), "%Y-%m-%d") {
            Ok(date) => {
                self.overlay = Overlay::None;
                self.set_date(field, date);
            }
            Err(_) => self.set_warning(format!(
                "\"{}\" is not a date (expected YYYY-MM-DD)",
                self.date_input.trim()
            )),
        }
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Push an error to the history and show it in the status bar.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
