//! Background worker thread: fetch and forecast run here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Every run
//! carries the generation it was requested under; the UI ignores responses
//! from older generations.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info};

use stockcast_core::data::{DataProvider, ProviderError};
use stockcast_core::domain::PriceHistory;
use stockcast_core::forecast::Forecaster;
use stockcast_core::pipeline::{fetch_stage, forecast_stage};
use stockcast_core::{DashboardInputs, ForecastStage};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Run {
        generation: u64,
        inputs: DashboardInputs,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    HistoryReady {
        generation: u64,
        result: Result<PriceHistory, ProviderError>,
    },
    ForecastReady {
        generation: u64,
        stage: ForecastStage,
    },
}

/// Spawn the worker thread.
pub fn spawn_worker(
    provider: Box<dyn DataProvider>,
    forecaster: Box<dyn Forecaster>,
    cmd_rx: Receiver<WorkerCommand>,
    resp_tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stockcast-worker".into())
        .spawn(move || worker_loop(&*provider, &*forecaster, cmd_rx, resp_tx))
}

fn worker_loop(
    provider: &dyn DataProvider,
    forecaster: &dyn Forecaster,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    let mut pending: Option<WorkerCommand> = None;
    loop {
        let cmd = match pending.take() {
            Some(cmd) => cmd,
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            },
        };
        let (generation, inputs) = match latest_command(&rx, cmd) {
            WorkerCommand::Shutdown => break,
            WorkerCommand::Run { generation, inputs } => (generation, inputs),
        };

        let started = Instant::now();
        let history = fetch_stage(provider, &inputs);
        let fit_input = history.as_ref().ok().cloned();
        if tx.send(WorkerResponse::HistoryReady { generation, result: history }).is_err() {
            break;
        }

        let history = match fit_input {
            Some(history) => history,
            None => {
                let stage = ForecastStage::Blocked;
                if tx.send(WorkerResponse::ForecastReady { generation, stage }).is_err() {
                    break;
                }
                continue;
            }
        };

        // Skip the fit when a newer run is already queued.
        match rx.try_recv() {
            Ok(newer) => {
                info!(generation, "superseded before fit, skipping forecast");
                pending = Some(newer);
                continue;
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        let stage = forecast_stage(forecaster, &Ok(history), inputs.horizon_days);
        debug!(
            generation,
            symbol = %inputs.symbol,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "run finished"
        );
        if tx.send(WorkerResponse::ForecastReady { generation, stage }).is_err() {
            break;
        }
    }
    debug!("worker exiting");
}

/// Collapse queued commands: the newest `Run` wins, `Shutdown` beats everything.
fn latest_command(rx: &Receiver<WorkerCommand>, first: WorkerCommand) -> WorkerCommand {
    let mut latest = first;
    let mut dropped = 0usize;
    if matches!(latest, WorkerCommand::Shutdown) {
        return latest;
    }
    while let Ok(next) = rx.try_recv() {
        if matches!(next, WorkerCommand::Shutdown) {
            return next;
        }
        latest = next;
        dropped += 1;
    }
    if dropped > 0 {
        debug!(dropped, "coalesced queued runs");
    }
    latest
}
