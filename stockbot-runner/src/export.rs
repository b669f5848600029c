//! Export of replay results as JSON and CSV artifacts.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: order log and equity curve for external analysis tools
//!
//! `result.json` carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::broker::OrderRecord;
use crate::runner::{EquityPoint, RunResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunResult` to pretty JSON.
pub fn export_json(result: &RunResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize RunResult to JSON")
}

/// Deserialize a `RunResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunResult> {
    let result: RunResult =
        serde_json::from_str(json).context("failed to deserialize RunResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the order log as CSV.
///
/// Columns: id, date, symbol, target_percent, target_shares, filled_shares, price
pub fn export_orders_csv(orders: &[OrderRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "date",
        "symbol",
        "target_percent",
        "target_shares",
        "filled_shares",
        "price",
    ])?;

    for o in orders {
        wtr.write_record([
            &o.id.to_string(),
            &o.date.map(|d| d.to_string()).unwrap_or_default(),
            &o.symbol,
            &o.target_percent
                .map(|t| format!("{t:.4}"))
                .unwrap_or_default(),
            &format!("{:.0}", o.target_shares),
            &format!("{:.0}", o.filled_shares),
            &format!("{:.4}", o.price),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV with date and equity columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity"])?;
    for point in equity_curve {
        wtr.write_record([&point.date.to_string(), &format!("{:.2}", point.equity)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `result.json`, `orders.csv`, and `equity.csv` into `output_dir`.
pub fn save_artifacts(result: &RunResult, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    std::fs::write(output_dir.join("result.json"), export_json(result)?)?;
    std::fs::write(
        output_dir.join("orders.csv"),
        export_orders_csv(&result.orders)?,
    )?;
    std::fs::write(
        output_dir.join("equity.csv"),
        export_equity_csv(&result.equity_curve)?,
    )?;
    Ok(())
}

/// Load a `RunResult` from an output directory's result.json.
pub fn load_artifacts(dir: &Path) -> Result<RunResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use stockbot_core::config::System;
    use stockbot_core::domain::OrderId;

    fn sample() -> RunResult {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        RunResult {
            schema_version: SCHEMA_VERSION,
            name: "adx_sar_so".into(),
            system: System::AdxSarSo,
            config_fingerprint: "abc".into(),
            dataset_hash: "def".into(),
            start_date: "2024-01-02".into(),
            end_date: "2024-01-02".into(),
            initial_capital: 1_000.0,
            final_equity: 1_010.0,
            bar_count: 1,
            rank_count: 0,
            missing_symbols: vec!["ZZZ".into()],
            orders: vec![OrderRecord {
                id: OrderId(1),
                date: Some(date),
                symbol: "AAA".into(),
                target_percent: Some(-0.1),
                target_shares: -3.0,
                filled_shares: -3.0,
                price: 33.25,
            }],
            equity_curve: vec![EquityPoint {
                date,
                equity: 1_010.0,
            }],
            final_positions: BTreeMap::from([("AAA".to_string(), -3.0)]),
        }
    }

    #[test]
    fn orders_csv_has_header_and_rows() {
        let csv = export_orders_csv(&sample().orders).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "id,date,symbol,target_percent,target_shares,filled_shares,price"
        );
        assert_eq!(lines[1], "1,2024-01-02,AAA,-0.1000,-3,-3,33.2500");
    }

    #[test]
    fn newer_schema_is_rejected() {
        let mut result = sample();
        result.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&result).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn artifacts_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("run");
        save_artifacts(&sample(), &out).unwrap();

        assert!(out.join("orders.csv").is_file());
        assert!(out.join("equity.csv").is_file());
        let loaded = load_artifacts(&out).unwrap();
        assert_eq!(loaded.orders, sample().orders);
        assert_eq!(loaded.final_positions["AAA"], -3.0);
    }
}
