//! Domain types for stockcast

pub mod bar;
pub mod forecast;
pub mod history;
pub mod symbol;

pub use bar::PriceBar;
pub use forecast::{Forecast, ForecastPoint};
pub use history::{PriceHistory, UnorderedDates};
pub use symbol::SymbolEntry;
