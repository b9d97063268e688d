//! Stockcast Core: symbol catalog, price history, forecast engine, pipeline.
//!
//! This crate holds everything the dashboard does apart from drawing:
//! - Domain types (price bars, histories, forecasts, symbol entries)
//! - Symbol catalog loading from CSV
//! - Market-data providers (Yahoo Finance, synthetic, static) and the
//!   normalisation that turns their bars into an ordered `PriceHistory`
//! - An additive trend + seasonality forecaster behind the `Forecaster` trait
//! - The pipeline that runs fetch and forecast for one set of inputs

pub mod data;
pub mod domain;
pub mod forecast;
pub mod pipeline;

pub use pipeline::{run_pipeline, DashboardInputs, ForecastStage, PipelineReport};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything handed to or returned from the TUI worker
    /// thread is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceHistory>();
        require_sync::<domain::PriceHistory>();
        require_send::<domain::Forecast>();
        require_sync::<domain::Forecast>();
        require_send::<data::SymbolCatalog>();
        require_sync::<data::SymbolCatalog>();
        require_send::<data::ProviderError>();
        require_send::<forecast::ModelFitError>();
        require_send::<pipeline::PipelineReport>();
        require_send::<DashboardInputs>();

        require_send::<Box<dyn data::DataProvider>>();
        require_sync::<Box<dyn data::DataProvider>>();
        require_send::<Box<dyn forecast::Forecaster>>();
        require_sync::<Box<dyn forecast::Forecaster>>();
    }

    /// Architecture contract: the forecaster sees only the history and horizon,
    /// never the provider that produced them.
    #[test]
    fn forecaster_trait_takes_only_history_and_horizon() {
        fn _check_trait_object_builds(
            f: &dyn forecast::Forecaster,
            history: &domain::PriceHistory,
        ) -> Result<domain::Forecast, forecast::ModelFitError> {
            f.forecast(history, 0)
        }
    }
}
