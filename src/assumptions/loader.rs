//! CSV-based assumption loader
//!
//! Loads the three shared tables from CSV files in an assumptions directory:
//!
//! - `mortality.csv` — columns `age,female,male` (annual qx)
//! - `credit_spreads.csv` — column `rating` followed by one column per tenor
//!   in years, values in whole basis points
//! - `treasury.csv` — columns `date,tenor,rate` with rates in percent; the
//!   most recent observation date wins

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;

use super::mortality::MortalityTable;
use super::spreads::{CreditSpreadCurve, Rating};
use super::treasury::RateCurve;
use crate::error::{AlmError, AlmResult};

/// Default path to the assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

fn parse_err(file: &str, detail: impl Into<String>) -> AlmError {
    AlmError::Parse {
        file: file.to_string(),
        detail: detail.into(),
    }
}

/// Load annual mortality rates from `mortality.csv`
pub fn load_mortality_table(path: &Path) -> AlmResult<MortalityTable> {
    const FILE: &str = "mortality.csv";
    let file = File::open(path.join(FILE))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut by_age: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        let age: usize = record
            .get(0)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| parse_err(FILE, format!("bad age in row {record:?}")))?;
        let female: f64 = record
            .get(1)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| parse_err(FILE, format!("bad female qx at age {age}")))?;
        let male: f64 = record
            .get(2)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| parse_err(FILE, format!("bad male qx at age {age}")))?;
        by_age.insert(age, (female, male));
    }

    if by_age.is_empty() {
        return Err(parse_err(FILE, "no rows"));
    }
    let max_age = *by_age.keys().last().unwrap_or(&0);
    let mut rates = Vec::with_capacity(max_age + 1);
    for age in 0..=max_age {
        let &(female, male) = by_age
            .get(&age)
            .ok_or_else(|| parse_err(FILE, format!("age {age} missing; ages must be contiguous")))?;
        rates.push((female, male));
    }
    MortalityTable::new(rates)
}

/// Load the credit spread grid from `credit_spreads.csv`
pub fn load_credit_spreads(path: &Path) -> AlmResult<CreditSpreadCurve> {
    const FILE: &str = "credit_spreads.csv";
    let file = File::open(path.join(FILE))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let tenors: Vec<f64> = headers
        .iter()
        .skip(1)
        .map(|h| {
            h.trim()
                .parse::<f64>()
                .map_err(|_| parse_err(FILE, format!("bad tenor column '{h}'")))
        })
        .collect::<AlmResult<_>>()?;

    let mut rows = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        let rating: Rating = record
            .get(0)
            .ok_or_else(|| parse_err(FILE, "missing rating column"))?
            .parse()?;
        let spreads: Vec<f64> = record
            .iter()
            .skip(1)
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| parse_err(FILE, format!("bad spread '{v}' for {rating}")))
            })
            .collect::<AlmResult<_>>()?;
        rows.insert(rating, spreads);
    }

    CreditSpreadCurve::new(tenors, rows)
}

/// Load the treasury curve from `treasury.csv`, keeping the latest date
pub fn load_treasury_curve(path: &Path) -> AlmResult<RateCurve> {
    const FILE: &str = "treasury.csv";
    let file = File::open(path.join(FILE))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut observations: BTreeMap<NaiveDate, Vec<(f64, f64)>> = BTreeMap::new();
    for result in reader.records() {
        let record = result?;
        let date = record
            .get(0)
            .and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
            .ok_or_else(|| parse_err(FILE, format!("bad date in row {record:?}")))?;
        let tenor: f64 = record
            .get(1)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| parse_err(FILE, format!("bad tenor in row {record:?}")))?;
        let pct: f64 = record
            .get(2)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| parse_err(FILE, format!("bad rate in row {record:?}")))?;
        observations
            .entry(date)
            .or_default()
            .push((tenor, pct / 100.0));
    }

    let (as_of, mut nodes) = observations
        .into_iter()
        .next_back()
        .ok_or_else(|| parse_err(FILE, "no observations"))?;
    nodes.sort_by(|a, b| a.0.total_cmp(&b.0));
    log::info!("treasury curve loaded as of {as_of} ({} tenors)", nodes.len());
    RateCurve::new(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::Gender;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn scratch_dir(label: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("alm_loader_{label}_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_mortality_table() {
        let dir = scratch_dir("mortality");
        write_file(
            &dir,
            "mortality.csv",
            "age,female,male\n0,0.001,0.0012\n1,0.0004,0.0005\n2,0.0003,0.0004\n",
        );

        let table = load_mortality_table(&dir).unwrap();
        assert_eq!(table.max_age(), 2);
        assert!((table.qx(1, Gender::Male).unwrap() - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn test_load_credit_spreads() {
        let dir = scratch_dir("spreads");
        write_file(
            &dir,
            "credit_spreads.csv",
            "rating,5,10\nAAA,30,45\nA,85,120\n",
        );

        let curve = load_credit_spreads(&dir).unwrap();
        assert_eq!(curve.spread_bps(Rating::AAA, 5.0).unwrap(), 30.0);
        assert!((curve.spread_bps(Rating::A, 7.5).unwrap() - 102.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_treasury_latest_date_wins() {
        let dir = scratch_dir("treasury");
        write_file(
            &dir,
            "treasury.csv",
            "date,tenor,rate\n\
             2026-07-01,5,3.90\n2026-07-01,10,4.00\n\
             2026-08-01,5,4.10\n2026-08-01,10,4.20\n",
        );

        let curve = load_treasury_curve(&dir).unwrap();
        assert!((curve.rate(5.0) - 0.041).abs() < 1e-12);
        assert!((curve.rate(10.0) - 0.042).abs() < 1e-12);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        let result = load_mortality_table(&dir.join("nope"));
        assert!(matches!(result, Err(AlmError::Io(_))));
    }
}
