//! Loading transaction history from a local JSON export.
//!
//! The engine itself never touches the filesystem; this module is the
//! boundary where an exported wallet journal becomes `Vec<Transaction>`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::types::Transaction;
use crate::{Error, Result};

/// Wrapped export format: `{ "transactions": [...] }`.
#[derive(Debug, Deserialize)]
struct JournalFile {
    transactions: Vec<Transaction>,
}

/// Get the default journal file path.
///
/// Default path: `~/.trade-analytics/transactions.json`
/// Can be overridden with the `TRADE_ANALYTICS_JOURNAL_FILE` environment variable.
pub fn default_path() -> PathBuf {
    if let Ok(path) = env::var("TRADE_ANALYTICS_JOURNAL_FILE") {
        return PathBuf::from(path);
    }

    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".trade-analytics/transactions.json"))
        .unwrap_or_else(|| PathBuf::from("transactions.json"))
}

/// Load and validate transactions from a JSON file.
///
/// A missing file is an empty history, not an error.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    if !path.exists() {
        debug!(path = %path.display(), "No journal file, starting from empty history");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    parse_transactions(&content)
}

/// Parse and validate transactions from JSON.
///
/// Accepts a bare array of transactions or an object with a `transactions` field.
pub fn parse_transactions(content: &str) -> Result<Vec<Transaction>> {
    let data: serde_json::Value = serde_json::from_str(content)?;

    let transactions: Vec<Transaction> = if data.is_array() {
        serde_json::from_value(data)?
    } else {
        serde_json::from_value::<JournalFile>(data)?.transactions
    };

    for (index, transaction) in transactions.iter().enumerate() {
        validate(index, transaction)?;
    }

    debug!(count = transactions.len(), "Parsed transactions");
    Ok(transactions)
}

fn validate(index: usize, transaction: &Transaction) -> Result<()> {
    if !transaction.unit_price.is_finite() || transaction.unit_price < 0.0 {
        return Err(Error::InvalidTransaction(format!(
            "#{} ({}): unit price must be a non-negative number, got {}",
            index, transaction.item_name, transaction.unit_price
        )));
    }
    if transaction.quantity == 0 {
        return Err(Error::InvalidTransaction(format!(
            "#{} ({}): quantity must be positive",
            index, transaction.item_name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TradeSide;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"[
        {
            "date": "2024-03-01T10:15:00Z",
            "item_id": 34,
            "item_name": "Tritanium",
            "side": "buy",
            "unit_price": 5.25,
            "quantity": 1000
        },
        {
            "date": "2024-03-02T08:00:00Z",
            "item_id": 34,
            "item_name": "Tritanium",
            "side": "sell",
            "unit_price": 5.75,
            "quantity": 400
        }
    ]"#;

    #[test]
    fn test_parse_bare_array() {
        let transactions = parse_transactions(SAMPLE).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].side, TradeSide::Buy);
        assert_eq!(transactions[1].quantity, 400);
        assert_eq!(transactions[1].unit_price, 5.75);
    }

    #[test]
    fn test_parse_wrapped_object() {
        let wrapped = format!(r#"{{ "transactions": {} }}"#, SAMPLE);
        let transactions = parse_transactions(&wrapped).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].item_name, "Tritanium");
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let bad = SAMPLE.replace("\"quantity\": 400", "\"quantity\": 0");
        let result = parse_transactions(&bad);
        assert!(matches!(result, Err(Error::InvalidTransaction(_))));
    }

    #[test]
    fn test_rejects_negative_price() {
        let bad = SAMPLE.replace("5.25", "-5.25");
        let result = parse_transactions(&bad);
        assert!(matches!(result, Err(Error::InvalidTransaction(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = parse_transactions("{ not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transactions.json");
        fs::write(&path, SAMPLE).unwrap();

        let transactions = load_transactions(&path).unwrap();
        assert_eq!(transactions.len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let transactions = load_transactions(&dir.path().join("missing.json")).unwrap();
        assert!(transactions.is_empty());
    }

    #[test]
    fn test_default_path_env_override() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("wallet.json");

        env::set_var("TRADE_ANALYTICS_JOURNAL_FILE", &custom);
        assert_eq!(default_path(), custom);

        env::remove_var("TRADE_ANALYTICS_JOURNAL_FILE");
        let fallback = default_path();
        assert_ne!(fallback, custom);
        assert!(fallback.ends_with("transactions.json"));
    }
}
