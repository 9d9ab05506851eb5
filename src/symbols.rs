use std::{collections::HashSet, path::Path};

use crate::{constants, model};

/// Reads the unique, upper-cased symbols from a CSV file with a header row.
///
/// The symbol column is the first header matching one of
/// `constants::SYMBOL_COLUMN_ALIASES`, in alias order.
pub fn read_symbols_from_file(symbols_file_path: &str) -> model::Result<Vec<String>> {
    // Validate symbols file path
    let path = Path::new(symbols_file_path);
    if !path.exists() {
        return Err(model::SyncError::FileNotFound(symbols_file_path.into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = constants::SYMBOL_COLUMN_ALIASES
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == *alias))
        .ok_or_else(|| model::SyncError::MissingSymbolColumn {
            path: symbols_file_path.into(),
            expected: &constants::SYMBOL_COLUMN_ALIASES,
        })?;

    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record?;
        let symbol = match record.get(column) {
            Some(value) => value.trim().to_uppercase(),
            None => continue,
        };
        if symbol.is_empty() {
            continue;
        }
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err(model::SyncError::EmptySymbolFile(symbols_file_path.into()));
    }
    Ok(symbols)
}
