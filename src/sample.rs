//! Sample data written to an empty store on first use.

use chrono::NaiveDate;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::{AirQualityRecord, Alert, AlertStatus, Citizen, Guideline, Pollutant};
use crate::store::{RecordStore, StoreError};
use crate::util::gen_id;

// ---

const CITIES: [&str; 20] = [
    "Delhi",
    "Mumbai",
    "Kolkata",
    "Chennai",
    "Bengaluru",
    "Hyderabad",
    "Ahmedabad",
    "Pune",
    "Lucknow",
    "Jaipur",
    "Bhopal",
    "Visakhapatnam",
    "Surat",
    "Kanpur",
    "Nagpur",
    "Indore",
    "Thane",
    "Agra",
    "Vadodara",
    "Nashik",
];

const DAYS_PER_CITY: u32 = 15;
const RNG_SEED: u64 = 42;

/// Seed the store unless it already has pollutant definitions.
///
/// An unreadable pollutant file is left alone. Returns `true` when sample
/// data was written.
pub fn ensure_sample_data(store: &RecordStore) -> Result<bool, StoreError> {
    // ---
    let pollutants = store.load::<Pollutant>();
    if pollutants.is_unreadable() {
        tracing::warn!("Pollutant file is unreadable, not seeding sample data");
        return Ok(false);
    }
    if !pollutants.is_empty() {
        return Ok(false);
    }
    create_sample_data(store)?;
    Ok(true)
}

/// Overwrite every collection with freshly generated sample data.
pub fn create_sample_data(store: &RecordStore) -> Result<(), StoreError> {
    // ---
    store.replace(&sample_pollutants())?;
    store.replace(&sample_guidelines())?;
    store.replace(&sample_citizens())?;
    let readings = sample_readings(RNG_SEED);
    store.replace(&readings)?;
    store.replace(&sample_alerts())?;

    tracing::info!(
        "Sample data created in {} ({} readings)",
        store.data_dir().display(),
        readings.len()
    );
    Ok(())
}

fn pollutant(id: &str, name: &str, description: &str, safe_limit: f64) -> Pollutant {
    Pollutant {
        pollutant_id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        safe_limit,
        extra: Default::default(),
    }
}

fn sample_pollutants() -> Vec<Pollutant> {
    // ---
    vec![
        pollutant("pol_pm25", "PM2.5", "Fine particulate matter (µg/m³)", 60.0),
        pollutant("pol_pm10", "PM10", "Coarse particulate matter (µg/m³)", 100.0),
        pollutant("pol_no2", "NO2", "Nitrogen dioxide (µg/m³)", 80.0),
        pollutant("pol_co", "CO", "Carbon monoxide (mg/m³)", 10.0),
        pollutant("pol_o3", "O3", "Ozone (µg/m³)", 120.0),
        pollutant("pol_so2", "SO2", "Sulfur dioxide (µg/m³)", 80.0),
    ]
}

fn sample_guidelines() -> Vec<Guideline> {
    // ---
    [
        ("g1", "0-50", "Good: No health impacts expected."),
        (
            "g2",
            "51-100",
            "Moderate: Unusually sensitive people should consider reducing prolonged outdoor exertion.",
        ),
        (
            "g3",
            "101-200",
            "Unhealthy: Sensitive groups should reduce prolonged outdoor exertion.",
        ),
        ("g4", "201-300", "Very Unhealthy: Avoid outdoor activities."),
        (
            "g5",
            "301-500",
            "Hazardous: Remain indoors and use protective measures.",
        ),
    ]
    .into_iter()
    .map(|(id, range, precautions)| Guideline {
        guide_id: id.to_string(),
        aqi_range: range.to_string(),
        precautions: precautions.to_string(),
        extra: Default::default(),
    })
    .collect()
}

fn sample_citizens() -> Vec<Citizen> {
    // ---
    vec![
        Citizen {
            citizen_id: "cit_alice".to_string(),
            name: "Alice".to_string(),
            age: "30".to_string(),
            location: "Delhi".to_string(),
            contact: "alice@example.com".to_string(),
            extra: Default::default(),
        },
        Citizen {
            citizen_id: "cit_bob".to_string(),
            name: "Bob".to_string(),
            age: "40".to_string(),
            location: "Mumbai".to_string(),
            contact: "bob@example.com".to_string(),
            extra: Default::default(),
        },
    ]
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Daily readings for every city in January 2025, pollutant levels scaled by
/// the AQI of the day.
fn sample_readings(seed: u64) -> Vec<AirQualityRecord> {
    // ---
    let mut rng = StdRng::seed_from_u64(seed);
    let mut readings = Vec::with_capacity(CITIES.len() * DAYS_PER_CITY as usize);

    for city in CITIES {
        for day in 1..=DAYS_PER_CITY {
            let date = NaiveDate::from_ymd_opt(2025, 1, day)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let aqi: i64 = rng.gen_range(50..=400);
            let scale = aqi as f64;

            let pollutants = [
                ("PM2.5", round_to(scale * rng.gen_range(0.3..0.9), 1)),
                ("PM10", round_to(scale * rng.gen_range(0.4..1.0), 1)),
                ("NO2", round_to(scale * rng.gen_range(0.05..0.25), 1)),
                ("CO", round_to(rng.gen_range(0.2..5.0) * (scale / 100.0), 2)),
                ("O3", round_to(rng.gen_range(10.0..150.0) * (scale / 200.0), 1)),
                ("SO2", round_to(rng.gen_range(5.0..80.0) * (scale / 200.0), 1)),
            ]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();

            readings.push(AirQualityRecord {
                record_id: gen_id("rec"),
                region: city.to_string(),
                date,
                aqi,
                pollutants,
                health_risk: String::new(),
                extra: Default::default(),
            });
        }
    }
    readings
}

fn sample_alerts() -> Vec<Alert> {
    // ---
    vec![
        Alert {
            alert_id: gen_id("alert"),
            region: "Delhi".to_string(),
            aqi_level: "Very Unhealthy".to_string(),
            status: AlertStatus::Active,
            issue_date: "2025-01-10".to_string(),
            expiry_date: "2025-01-12".to_string(),
            extra: Default::default(),
        },
        Alert {
            alert_id: gen_id("alert"),
            region: "Kanpur".to_string(),
            aqi_level: "Hazardous".to_string(),
            status: AlertStatus::Active,
            issue_date: "2025-01-08".to_string(),
            expiry_date: "2025-01-11".to_string(),
            extra: Default::default(),
        },
    ]
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::engine::{average_aqi_by_region, latest_per_region};
    use tempfile::tempdir;

    #[test]
    fn test_sample_readings_shape() {
        // ---
        let readings = sample_readings(RNG_SEED);
        assert_eq!(readings.len(), 300);
        assert!(readings.iter().all(|r| (50..=400).contains(&r.aqi)));
        assert!(readings.iter().all(|r| r.pollutants.len() == 6));
        assert_eq!(readings[0].date, "2025-01-01");
        assert_eq!(readings[14].date, "2025-01-15");

        let averages = average_aqi_by_region(&readings);
        assert_eq!(averages.len(), CITIES.len());
        assert!(averages.iter().all(|a| a.count == DAYS_PER_CITY as usize));

        let latest = latest_per_region(&readings);
        assert!(latest.iter().all(|r| r.date == "2025-01-15"));
    }

    #[test]
    fn test_sample_readings_deterministic_values() {
        // ---
        let a: Vec<i64> = sample_readings(7).iter().map(|r| r.aqi).collect();
        let b: Vec<i64> = sample_readings(7).iter().map(|r| r.aqi).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ensure_sample_data_only_once() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        assert!(ensure_sample_data(&store).unwrap());
        let first: Vec<AirQualityRecord> = store.load().into_items();
        assert!(!ensure_sample_data(&store).unwrap());
        let second: Vec<AirQualityRecord> = store.load().into_items();

        assert_eq!(first, second);
        assert_eq!(store.load::<Guideline>().len(), 5);
        assert_eq!(store.load::<Alert>().len(), 2);
        assert_eq!(store.load::<Citizen>().len(), 2);
    }

    #[test]
    fn test_unreadable_pollutants_block_seeding() {
        // ---
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        std::fs::write(store.path(crate::store::Collection::Pollutants), "oops").unwrap();

        assert!(!ensure_sample_data(&store).unwrap());
        assert!(store.load::<AirQualityRecord>().is_empty());
    }
}
