//! Catalog loading from files on disk.

use std::io::Write;
use std::path::PathBuf;

use stockcast_core::data::{CatalogError, SymbolCatalog};

fn write_catalog(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn bundled_catalog_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../resources/nasdaq_tickers.csv");
    let catalog = SymbolCatalog::load(&path).unwrap();
    assert!(catalog.len() >= 20);
    for entry in catalog.entries() {
        // Every symbol the selector offers resolves to a name.
        assert!(catalog.display_name(&entry.symbol).is_some());
    }
    assert_eq!(catalog.display_name("AAPL"), Some("Apple Inc."));
}

#[test]
fn missing_symbol_column_fails_at_load() {
    let file = write_catalog("ticker,name\nAAPL,Apple Inc.\nMSFT,Microsoft Corporation\n");
    let err = SymbolCatalog::load(file.path()).unwrap_err();
    assert!(matches!(err, CatalogError::MissingColumn(ref c) if c == "symbol"));
}

#[test]
fn empty_file_fails_at_load() {
    let file = write_catalog("");
    assert!(matches!(SymbolCatalog::load(file.path()).unwrap_err(), CatalogError::Empty));
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = SymbolCatalog::load(&path).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn header_whitespace_and_case_are_ignored() {
    let file = write_catalog(" Symbol , NAME \n NVDA , NVIDIA Corporation \n");
    let catalog = SymbolCatalog::load(file.path()).unwrap();
    assert_eq!(catalog.display_name("NVDA"), Some("NVIDIA Corporation"));
}
