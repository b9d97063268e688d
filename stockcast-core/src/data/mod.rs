//! Symbol catalog, market-data providers and price history normalisation

pub mod catalog;
pub mod frame;
pub mod history;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use catalog::{CatalogError, SymbolCatalog};
pub use frame::{BarSchema, Canonicalizer, FrameError};
pub use history::fetch_history;
pub use provider::{DataProvider, FetchResult, ProviderError, RawBar};
pub use synthetic::{StaticProvider, SyntheticProvider};
pub use yahoo::{YahooProvider, DEFAULT_USER_AGENT};
