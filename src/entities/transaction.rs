// 💳 Transaction record - raw financial row grouped into vendors
//
// Amounts and dates come straight from imports, so both are parsed
// leniently here and a failure is reported by the caller as a data
// integrity warning rather than aborting a build.

use crate::key::RecordId;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// RAW AMOUNT
// ============================================================================

/// Amount as it appears in the source: a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl Default for RawAmount {
    fn default() -> Self {
        RawAmount::Text(String::new())
    }
}

impl RawAmount {
    /// Parsed signed value; `None` when the source is not a finite number
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawAmount::Number(n) if n.is_finite() => Some(*n),
            RawAmount::Number(_) => None,
            RawAmount::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| *c != '$' && *c != ',')
                    .collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
    }

    pub fn raw(&self) -> String {
        match self {
            RawAmount::Number(n) => n.to_string(),
            RawAmount::Text(s) => s.clone(),
        }
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: RecordId,

    /// Category the transaction is filed under
    #[serde(default)]
    pub category_id: Option<RecordId>,

    /// External vendor the transaction belongs to, when vendors are supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<RecordId>,

    /// Original bank description (e.g., "SHELL OIL 57442")
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub amount: RawAmount,

    /// "debit" / "credit" as reported by the source
    #[serde(default)]
    pub direction: String,

    #[serde(default)]
    pub date: String,
}

impl TransactionRecord {
    pub fn new(id: impl Into<RecordId>, category_id: impl Into<RecordId>, amount: f64) -> Self {
        TransactionRecord {
            id: id.into(),
            category_id: Some(category_id.into()),
            vendor_id: None,
            description: None,
            amount: RawAmount::Number(amount),
            direction: if amount < 0.0 { "debit" } else { "credit" }.to_string(),
            date: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn with_vendor(mut self, vendor_id: impl Into<RecordId>) -> Self {
        self.vendor_id = Some(vendor_id.into());
        self
    }

    /// Absolute amount; `None` when the amount is unparsable
    pub fn absolute_amount(&self) -> Option<f64> {
        self.amount.parse().map(f64::abs)
    }

    /// Non-blank description, trimmed
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn category_key(&self) -> Option<String> {
        self.category_id.as_ref().map(RecordId::key)
    }

    /// Parsed date; `None` for empty or unrecognized formats
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date)
    }
}

/// First occurrence of every transaction id, input order, plus the keys of
/// later occurrences that were dropped.
pub fn dedup_by_id(transactions: &[TransactionRecord]) -> (Vec<&TransactionRecord>, Vec<String>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(transactions.len());
    let mut dropped = Vec::new();
    for tx in transactions {
        let key = tx.id.key();
        if seen.insert(key.clone()) {
            unique.push(tx);
        } else {
            dropped.push(key);
        }
    }
    (unique, dropped)
}

/// Parse the date formats seen in imports: RFC 3339, ISO date(-time), and
/// US-style MM/DD/YYYY.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parsing() {
        assert_eq!(RawAmount::Number(-12.3).parse(), Some(-12.3));
        assert_eq!(RawAmount::Text(" $1,204.50 ".to_string()).parse(), Some(1204.5));
        assert_eq!(RawAmount::Text("-7".to_string()).parse(), Some(-7.0));
        assert_eq!(RawAmount::Text("twelve".to_string()).parse(), None);
        assert_eq!(RawAmount::Text(String::new()).parse(), None);
    }

    #[test]
    fn test_absolute_amount() {
        let tx = TransactionRecord::new(1, 2, -12.3);
        assert_eq!(tx.absolute_amount(), Some(12.3));
        assert_eq!(tx.direction, "debit");
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date("03/05/2024"), Some(expected));
        assert_eq!(parse_date("2024-03-05T00:00:00Z"), Some(expected));
        assert_eq!(parse_date("2024-03-05 00:00:00"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_transaction_from_source_json() {
        let json = r#"{
            "id": 9, "categoryId": "2", "description": "  SHELL 0042 ",
            "amount": "-40.10", "direction": "debit", "date": "2024-01-02"
        }"#;
        let tx: TransactionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(tx.category_key(), Some("2".to_string()));
        assert_eq!(tx.description_text(), Some("SHELL 0042"));
        assert_eq!(tx.absolute_amount(), Some(40.1));
        assert!(tx.parsed_date().is_some());
        assert_eq!(tx.vendor_id, None);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let txs = vec![
            TransactionRecord::new(1, 2, -5.0),
            TransactionRecord::new("1", 3, -7.0),
            TransactionRecord::new(2, 2, -1.0),
        ];

        let (unique, dropped) = dedup_by_id(&txs);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].absolute_amount(), Some(5.0));
        assert_eq!(dropped, vec!["1".to_string()]);
    }

    #[test]
    fn test_blank_description_is_absent() {
        let tx = TransactionRecord::new(1, 1, 5.0).with_description("   ");
        assert_eq!(tx.description_text(), None);
    }
}
