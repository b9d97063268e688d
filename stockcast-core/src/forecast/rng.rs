//! Deterministic seeding for the uncertainty simulation.
//!
//! The seed is a BLAKE3 hash of everything the forecast depends on, so the
//! same symbol, bars and horizon always produce the same bands, and any
//! change to the inputs produces an unrelated sample stream.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::frame::date_to_days;
use crate::domain::PriceHistory;

/// Derive the simulation seed for one forecast request.
pub fn forecast_seed(history: &PriceHistory, horizon_days: u32) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(history.symbol().as_bytes());
    hasher.update(&(history.len() as u64).to_le_bytes());
    for bar in history.bars() {
        hasher.update(&date_to_days(bar.date).to_le_bytes());
        hasher.update(&bar.close.to_bits().to_le_bytes());
    }
    hasher.update(&horizon_days.to_le_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

pub fn rng_for(history: &PriceHistory, horizon_days: u32) -> StdRng {
    StdRng::seed_from_u64(forecast_seed(history, horizon_days))
}
