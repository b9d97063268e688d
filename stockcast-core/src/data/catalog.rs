//! Symbol catalog: the static ticker → display name table.
//!
//! The catalog is a CSV resource with at least the columns `symbol` and
//! `name`. It is loaded once at startup and then passed around by reference;
//! the symbol selector and the name lookup are both built from it, so a
//! symbol offered by the selector always resolves to a name.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::SymbolEntry;

const SYMBOL_COLUMN: &str = "symbol";
const NAME_COLUMN: &str = "name";

/// Errors raised while loading the catalog. Any of them leaves no catalog behind.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read symbol catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symbol catalog is missing required column '{0}'")]
    MissingColumn(String),

    #[error("symbol catalog is empty")]
    Empty,

    #[error("malformed symbol catalog at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

/// Read-only symbol table, in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct SymbolCatalog {
    entries: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}

impl SymbolCatalog {
    /// Load the catalog from a CSV file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(file)?;
        debug!(path = %path.display(), symbols = catalog.len(), "symbol catalog loaded");
        Ok(catalog)
    }

    /// Parse a catalog from any CSV source.
    ///
    /// A symbol that appears more than once keeps its first position but takes
    /// the display name of its last row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| CatalogError::Malformed {
                line: 1,
                reason: e.to_string(),
            })?
            .clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(CatalogError::Empty);
        }

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| CatalogError::MissingColumn(name.to_string()))
        };
        let symbol_idx = column(SYMBOL_COLUMN)?;
        let name_idx = column(NAME_COLUMN)?;

        let mut catalog = Self::default();
        for (row, record) in rdr.records().enumerate() {
            // Header is line 1.
            let line = row as u64 + 2;
            let record = record.map_err(|e| CatalogError::Malformed {
                line,
                reason: e.to_string(),
            })?;

            let symbol = record.get(symbol_idx).unwrap_or_default();
            if symbol.is_empty() {
                return Err(CatalogError::Malformed {
                    line,
                    reason: "blank symbol".into(),
                });
            }
            let name = match record.get(name_idx).unwrap_or_default() {
                "" => symbol,
                name => name,
            };
            catalog.insert(SymbolEntry::new(symbol, name));
        }

        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    /// Build a catalog from entries already in memory (same duplicate policy).
    pub fn from_entries(entries: impl IntoIterator<Item = SymbolEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.insert(entry);
        }
        catalog
    }

    fn insert(&mut self, entry: SymbolEntry) {
        match self.index.get(&entry.symbol) {
            Some(&i) => {
                warn!(
                    symbol = %entry.symbol,
                    previous = %self.entries[i].display_name,
                    replacement = %entry.display_name,
                    "duplicate symbol in catalog, keeping last name"
                );
                self.entries[i].display_name = entry.display_name;
            }
            None => {
                self.index.insert(entry.symbol.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, symbol: &str) -> Option<&SymbolEntry> {
        self.index.get(symbol).map(|&i| &self.entries[i])
    }

    pub fn display_name(&self, symbol: &str) -> Option<&str> {
        self.lookup(symbol).map(|e| e.display_name.as_str())
    }

    /// Selector position of a symbol.
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    pub fn get(&self, position: usize) -> Option<&SymbolEntry> {
        self.entries.get(position)
    }

    /// Positions of entries whose symbol or name contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<usize> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                needle.is_empty()
                    || e.symbol.to_lowercase().contains(&needle)
                    || e.display_name.to_lowercase().contains(&needle)
            })
            .map(|(i, _)| i)
            .collect()
    }
}
