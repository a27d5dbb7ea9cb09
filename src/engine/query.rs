use std::collections::HashMap;

use crate::models::{AirQualityRecord, Alert, AlertStatus};

use super::region_matches;

// ---

/// Records whose `date` equals `date` exactly.
pub fn filter_by_date<'a>(records: &'a [AirQualityRecord], date: &str) -> Vec<&'a AirQualityRecord> {
    // ---
    records.iter().filter(|r| r.date == date).collect()
}

/// Records whose `region` equals `region`, ignoring case.
pub fn filter_by_region<'a>(
    records: &'a [AirQualityRecord],
    region: &str,
) -> Vec<&'a AirQualityRecord> {
    // ---
    records
        .iter()
        .filter(|r| region_matches(&r.region, region))
        .collect()
}

/// Records that carry a level for `pollutant_name`, whatever its value.
pub fn filter_by_pollutant<'a>(
    records: &'a [AirQualityRecord],
    pollutant_name: &str,
) -> Vec<&'a AirQualityRecord> {
    // ---
    records
        .iter()
        .filter(|r| r.pollutants.contains_key(pollutant_name))
        .collect()
}

/// One record per distinct region, in order of first appearance.
///
/// The winner for a region has the lexicographically greatest `date`. A later
/// record only replaces the current one on a strictly greater date, so among
/// equal dates the earliest-seen record is kept. Regions are grouped by exact
/// string.
pub fn latest_per_region(records: &[AirQualityRecord]) -> Vec<&AirQualityRecord> {
    // ---
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&AirQualityRecord> = Vec::new();

    for r in records {
        match index.get(r.region.as_str()) {
            Some(&i) => {
                if r.date > latest[i].date {
                    latest[i] = r;
                }
            }
            None => {
                index.insert(r.region.as_str(), latest.len());
                latest.push(r);
            }
        }
    }
    latest
}

/// Most recent record for `region` (case-insensitive).
///
/// Highest `date` wins; among equal dates the record appearing last in the
/// input wins.
pub fn latest_for_region<'a>(
    records: &'a [AirQualityRecord],
    region: &str,
) -> Option<&'a AirQualityRecord> {
    // ---
    // `max_by` returns the last of several equal maxima.
    records
        .iter()
        .filter(|r| region_matches(&r.region, region))
        .max_by(|a, b| a.date.cmp(&b.date))
}

/// Active alerts for `region` (case-insensitive), in input order.
pub fn active_alerts_for_region<'a>(alerts: &'a [Alert], region: &str) -> Vec<&'a Alert> {
    // ---
    alerts
        .iter()
        .filter(|a| a.status == AlertStatus::Active && region_matches(&a.region, region))
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::PollutantLevels;

    fn record(id: &str, region: &str, date: &str, aqi: i64, pollutants: &[&str]) -> AirQualityRecord {
        // ---
        AirQualityRecord {
            record_id: id.to_string(),
            region: region.to_string(),
            date: date.to_string(),
            aqi,
            pollutants: pollutants
                .iter()
                .map(|p| (p.to_string(), 10.0))
                .collect::<PollutantLevels>(),
            health_risk: String::new(),
            extra: Default::default(),
        }
    }

    fn ids(records: &[&AirQualityRecord]) -> Vec<String> {
        records.iter().map(|r| r.record_id.clone()).collect()
    }

    fn sample() -> Vec<AirQualityRecord> {
        // ---
        vec![
            record("r1", "Delhi", "2025-01-01", 100, &["PM2.5", "NO2"]),
            record("r2", "Mumbai", "2025-01-03", 60, &["PM10"]),
            record("r3", "delhi", "2025-01-02", 140, &[]),
            record("r4", "Delhi", "2025-01-03", 180, &["PM2.5"]),
            record("r5", "Mumbai", "2025-01-02", 70, &["NO2"]),
        ]
    }

    #[test]
    fn test_filter_by_date_exact_match() {
        // ---
        let records = sample();
        assert_eq!(ids(&filter_by_date(&records, "2025-01-03")), vec!["r2", "r4"]);
        assert!(filter_by_date(&records, "2025-1-3").is_empty());
        assert!(filter_by_date(&[], "2025-01-03").is_empty());
    }

    #[test]
    fn test_filter_by_region_is_case_insensitive() {
        // ---
        let records = sample();
        let upper = filter_by_region(&records, "Delhi");
        let lower = filter_by_region(&records, "delhi");

        assert_eq!(ids(&upper), vec!["r1", "r3", "r4"]);
        assert_eq!(ids(&upper), ids(&lower));
        assert!(filter_by_region(&records, "Chennai").is_empty());
    }

    #[test]
    fn test_filter_by_pollutant_presence() {
        // ---
        let records = sample();
        assert_eq!(ids(&filter_by_pollutant(&records, "NO2")), vec!["r1", "r5"]);
        assert_eq!(ids(&filter_by_pollutant(&records, "PM2.5")), vec!["r1", "r4"]);
        assert!(filter_by_pollutant(&records, "pm2.5").is_empty());
    }

    #[test]
    fn test_latest_per_region() {
        // ---
        let records = sample();
        let latest = latest_per_region(&records);

        // "delhi" and "Delhi" are distinct keys here
        assert_eq!(ids(&latest), vec!["r4", "r2", "r3"]);
        for winner in &latest {
            assert!(records
                .iter()
                .filter(|r| r.region == winner.region)
                .all(|r| r.date <= winner.date));
        }
    }

    #[test]
    fn test_latest_per_region_tie_keeps_first_seen() {
        // ---
        let records = vec![
            record("a", "Pune", "2025-01-05", 90, &[]),
            record("b", "Pune", "2025-01-05", 95, &[]),
            record("c", "Pune", "2025-01-04", 99, &[]),
        ];
        assert_eq!(ids(&latest_per_region(&records)), vec!["a"]);
        assert!(latest_per_region(&[]).is_empty());
    }

    #[test]
    fn test_latest_for_region() {
        // ---
        let records = sample();
        assert_eq!(
            latest_for_region(&records, "DELHI").map(|r| r.record_id.as_str()),
            Some("r4")
        );
        assert_eq!(
            latest_for_region(&records, "mumbai").map(|r| r.record_id.as_str()),
            Some("r2")
        );
        assert!(latest_for_region(&records, "Jaipur").is_none());
        assert!(latest_for_region(&[], "Delhi").is_none());
    }

    #[test]
    fn test_latest_for_region_tie_takes_last_appended() {
        // ---
        let records = vec![
            record("a", "Pune", "2025-01-05", 90, &[]),
            record("b", "pune", "2025-01-05", 95, &[]),
            record("c", "Pune", "2025-01-01", 99, &[]),
        ];
        assert_eq!(
            latest_for_region(&records, "Pune").map(|r| r.record_id.as_str()),
            Some("b")
        );
    }

    #[test]
    fn test_active_alerts_for_region() {
        // ---
        let alert = |id: &str, region: &str, status: AlertStatus| Alert {
            alert_id: id.to_string(),
            region: region.to_string(),
            aqi_level: "Hazardous".to_string(),
            status,
            issue_date: "2025-01-08".to_string(),
            expiry_date: String::new(),
            extra: Default::default(),
        };
        let alerts = vec![
            alert("a1", "Kanpur", AlertStatus::Active),
            alert("a2", "kanpur", AlertStatus::Withdrawn),
            alert("a3", "KANPUR", AlertStatus::Active),
            alert("a4", "Delhi", AlertStatus::Active),
        ];

        let found: Vec<&str> = active_alerts_for_region(&alerts, "Kanpur")
            .iter()
            .map(|a| a.alert_id.as_str())
            .collect();
        assert_eq!(found, vec!["a1", "a3"]);
    }
}
