//! Bulk import of air quality records from JSON or CSV files.
//!
//! - `.json`: an array of record objects; elements without a `record_id` get
//!   a generated one, elements that do not decode are skipped.
//! - `.csv`: a header row with `region`, `date`, `AQI`, `health_risk` and one
//!   column per known pollutant name. Every row gets a generated id.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;

use crate::models::{AirQualityRecord, PollutantLevels};
use crate::util::{gen_id, parse_float};

// ---

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type '{0}'. Use .json or .csv")]
    Unsupported(String),

    #[error("JSON must be a list of records.")]
    NotAList,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Read the records contained in `path`.
///
/// `known_pollutants` names the CSV columns read as pollutant levels; `today`
/// is used for CSV files that have no `date` column.
pub fn read_records(
    path: &Path,
    known_pollutants: &[String],
    today: &str,
) -> Result<Vec<AirQualityRecord>, ImportError> {
    // ---
    if !path.exists() {
        return Err(ImportError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "json" => read_json(path),
        "csv" => read_csv(path, known_pollutants, today),
        _ => Err(ImportError::Unsupported(ext)),
    }
}

fn read_json(path: &Path) -> Result<Vec<AirQualityRecord>, ImportError> {
    // ---
    let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let items = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(items)) => items,
        Ok(_) => return Err(ImportError::NotAList),
        Err(source) => {
            return Err(ImportError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<AirQualityRecord>(item) {
            Ok(mut rec) => {
                if rec.record_id.is_empty() {
                    rec.record_id = gen_id("rec");
                }
                records.push(rec);
            }
            Err(e) => {
                tracing::warn!("Skipping element {} of {}: {}", i, path.display(), e);
            }
        }
    }
    Ok(records)
}

fn read_csv(
    path: &Path,
    known_pollutants: &[String],
    today: &str,
) -> Result<Vec<AirQualityRecord>, ImportError> {
    // ---
    let csv_err = |source: csv::Error| ImportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut records = Vec::new();
    for row in reader.deserialize::<HashMap<String, String>>() {
        let row = row.map_err(csv_err)?;
        let field = |name: &str| row.get(name).map(String::as_str);

        let pollutants: PollutantLevels = known_pollutants
            .iter()
            .filter_map(|name| match field(name.as_str()) {
                Some(v) if !v.is_empty() => Some((name.clone(), parse_float(v, 0.0))),
                _ => None,
            })
            .collect();

        records.push(AirQualityRecord {
            record_id: gen_id("rec"),
            region: field("region").unwrap_or_default().to_string(),
            date: field("date").unwrap_or(today).to_string(),
            aqi: parse_float(field("AQI").unwrap_or("0"), 0.0) as i64,
            pollutants,
            health_risk: field("health_risk").unwrap_or_default().to_string(),
            extra: Default::default(),
        });
    }

    tracing::debug!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use tempfile::tempdir;

    fn known() -> Vec<String> {
        vec!["PM2.5".to_string(), "NO2".to_string()]
    }

    #[test]
    fn test_read_json_assigns_missing_ids() {
        // ---
        let dir = tempdir().unwrap();
        let path = dir.path().join("bulk.json");
        fs::write(
            &path,
            r#"[
                {"record_id": "rec_keep", "region": "Delhi", "date": "2025-02-01", "AQI": 210},
                {"region": "Pune", "date": "2025-02-01", "AQI": 75.8, "pollutants": {"NO2": 9}},
                "not a record"
            ]"#,
        )
        .unwrap();

        let records = read_records(&path, &known(), "2025-03-01").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_id, "rec_keep");
        assert!(records[1].record_id.starts_with("rec_"));
        assert_eq!(records[1].aqi, 75);
        assert_eq!(records[1].pollutants["NO2"], 9.0);
    }

    #[test]
    fn test_read_json_rejects_non_list() {
        // ---
        let dir = tempdir().unwrap();
        let path = dir.path().join("bulk.JSON");
        fs::write(&path, r#"{"region": "Delhi"}"#).unwrap();

        let err = read_records(&path, &known(), "2025-03-01").unwrap_err();
        assert!(matches!(err, ImportError::NotAList));
    }

    #[test]
    fn test_read_csv_rows() {
        // ---
        let dir = tempdir().unwrap();
        let path = dir.path().join("bulk.csv");
        fs::write(
            &path,
            "region,date,AQI,PM2.5,NO2,SO2\n\
             Delhi,2025-02-01,180,95.5,,3\n\
             Agra,2025-02-02,oops,40,12,\n",
        )
        .unwrap();

        let records = read_records(&path, &known(), "2025-03-01").unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].region, "Delhi");
        assert_eq!(records[0].aqi, 180);
        assert_eq!(records[0].pollutants.len(), 1);
        assert_eq!(records[0].pollutants["PM2.5"], 95.5);
        assert_eq!(records[0].health_risk, "");

        assert_eq!(records[1].aqi, 0);
        assert_eq!(records[1].pollutants["NO2"], 12.0);
        assert_ne!(records[0].record_id, records[1].record_id);
    }

    #[test]
    fn test_read_csv_without_date_column_uses_today() {
        // ---
        let dir = tempdir().unwrap();
        let path = dir.path().join("bulk.csv");
        fs::write(&path, "region,AQI\nSurat,99\n").unwrap();

        let records = read_records(&path, &known(), "2025-03-01").unwrap();
        assert_eq!(records[0].date, "2025-03-01");
        assert_eq!(records[0].aqi, 99);
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        // ---
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            read_records(&missing, &known(), "2025-03-01"),
            Err(ImportError::NotFound(_))
        ));

        let txt = dir.path().join("bulk.txt");
        fs::write(&txt, "hello").unwrap();
        match read_records(&txt, &known(), "2025-03-01") {
            Err(ImportError::Unsupported(ext)) => assert_eq!(ext, "txt"),
            other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
        }
    }
}
