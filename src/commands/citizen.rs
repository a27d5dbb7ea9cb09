use std::io::Write;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CitizenCommand, SearchArgs};
use crate::engine::{
    active_alerts_for_region, filter_by_date, filter_by_pollutant, filter_by_region,
    latest_for_region, latest_per_region, monthly_trend,
};
use crate::models::{AirQualityRecord, Alert, Citizen, Guideline};
use crate::store::RecordStore;
use crate::table::{format_levels, format_mean, render_table};
use crate::util::{find_by_id, find_by_id_mut, gen_id};

use super::{print_rows, CommandError};

// ---

/// Ways of searching historical readings.
#[derive(Debug, Clone, PartialEq)]
enum SearchMode {
    Date(String),
    Region(String),
    Pollutant(String),
    LatestPerRegion,
}

impl From<SearchArgs> for SearchMode {
    fn from(args: SearchArgs) -> Self {
        // ---
        if let Some(date) = args.date {
            SearchMode::Date(date.trim().to_string())
        } else if let Some(region) = args.region {
            SearchMode::Region(region.trim().to_string())
        } else if let Some(pollutant) = args.pollutant {
            SearchMode::Pollutant(pollutant.trim().to_string())
        } else {
            SearchMode::LatestPerRegion
        }
    }
}

pub fn run<W: Write>(
    citizen_id: &str,
    command: CitizenCommand,
    store: &RecordStore,
    out: &mut W,
) -> Result<()> {
    // ---
    let citizens = store.load::<Citizen>();
    let citizen = find_by_id(&citizens, citizen_id.trim())
        .cloned()
        .ok_or_else(|| CommandError::UnknownCitizen(citizen_id.to_string()))?;
    debug!("Citizen '{}' logged in", citizen.citizen_id);

    match command {
        CitizenCommand::Current => view_current(store, &citizen, out),
        CitizenCommand::Search(args) => search(store, args.into(), out),
        CitizenCommand::Trends => view_trends(store, &citizen, out),
        CitizenCommand::Guidelines => guidelines(store, out),
        CitizenCommand::Profile {
            name,
            age,
            location,
            contact,
        } => update_profile(
            store,
            &citizen.citizen_id,
            ProfileChanges {
                name,
                age,
                location,
                contact,
            },
            out,
        ),
    }
}

/// Pick a citizen id: `cit_<first name>` when free, otherwise a random one.
fn citizen_id_for(name: &str, existing: &[Citizen]) -> String {
    // ---
    let candidate = name
        .split_whitespace()
        .next()
        .map(|first| format!("cit_{}", first.to_lowercase()));

    match candidate {
        Some(id) if find_by_id(existing, &id).is_none() => id,
        _ => gen_id("cit"),
    }
}

pub fn register<W: Write>(
    store: &RecordStore,
    name: &str,
    age: Option<&str>,
    location: &str,
    contact: &str,
    out: &mut W,
) -> Result<()> {
    // ---
    let mut citizens = store.load::<Citizen>();
    let citizen = Citizen {
        citizen_id: citizen_id_for(name, &citizens),
        name: name.trim().to_string(),
        age: age.unwrap_or_default().trim().to_string(),
        location: location.trim().to_string(),
        contact: contact.trim().to_string(),
        extra: Default::default(),
    };

    let citizen_id = citizen.citizen_id.clone();
    citizens.push(citizen);
    store.save(&citizens)?;

    info!("Registered citizen {}", citizen_id);
    writeln!(out, "Registered. Your Citizen ID: {}", citizen_id)?;
    Ok(())
}

fn reading_rows(records: &[&AirQualityRecord]) -> Vec<Vec<String>> {
    // ---
    records
        .iter()
        .map(|r| {
            vec![
                r.record_id.clone(),
                r.date.clone(),
                r.region.clone(),
                r.aqi.to_string(),
                format_levels(&r.pollutants),
            ]
        })
        .collect()
}

fn view_current<W: Write>(store: &RecordStore, citizen: &Citizen, out: &mut W) -> Result<()> {
    // ---
    let region = citizen.location.as_str();
    let air: Vec<AirQualityRecord> = store.load().into_items();

    let Some(latest) = latest_for_region(&air, region) else {
        writeln!(out, "No AQI data for region: {}", region)?;
        return Ok(());
    };

    let row = vec![
        latest.date.clone(),
        latest.region.clone(),
        latest.aqi.to_string(),
        format_levels(&latest.pollutants),
    ];
    write!(
        out,
        "{}",
        render_table(&[row], &["Date", "Region", "AQI", "Pollutants"])
    )?;

    let alerts: Vec<Alert> = store.load().into_items();
    for alert in active_alerts_for_region(&alerts, region) {
        writeln!(
            out,
            "ALERT: {} issued on {} (id {})",
            alert.aqi_level, alert.issue_date, alert.alert_id
        )?;
    }
    Ok(())
}

fn search<W: Write>(store: &RecordStore, mode: SearchMode, out: &mut W) -> Result<()> {
    // ---
    let air: Vec<AirQualityRecord> = store.load().into_items();
    if air.is_empty() {
        writeln!(out, "No air quality data available.")?;
        return Ok(());
    }

    let results = match &mode {
        SearchMode::Date(date) => filter_by_date(&air, date),
        SearchMode::Region(region) => filter_by_region(&air, region),
        SearchMode::Pollutant(name) => filter_by_pollutant(&air, name),
        SearchMode::LatestPerRegion => latest_per_region(&air),
    };
    debug!("Search {:?} matched {} records", mode, results.len());

    print_rows(
        out,
        reading_rows(&results),
        &["ID", "Date", "Region", "AQI", "Pollutants"],
        "No matches found.",
    )
}

fn view_trends<W: Write>(store: &RecordStore, citizen: &Citizen, out: &mut W) -> Result<()> {
    // ---
    let air: Vec<AirQualityRecord> = store.load().into_items();
    let trend = monthly_trend(filter_by_region(&air, &citizen.location));

    let rows = trend
        .into_iter()
        .map(|p| vec![p.key.to_string(), format_mean(p.mean_aqi), p.count.to_string()])
        .collect();
    print_rows(
        out,
        rows,
        &["Month", "Avg AQI", "Readings"],
        &format!("No AQI data for region: {}", citizen.location),
    )
}

fn guidelines<W: Write>(store: &RecordStore, out: &mut W) -> Result<()> {
    // ---
    let guides: Vec<Guideline> = store.load().into_items();
    let rows = guides
        .into_iter()
        .map(|g| vec![g.guide_id, g.aqi_range, g.precautions])
        .collect();
    print_rows(
        out,
        rows,
        &["ID", "AQI Range", "Precautions"],
        "No guidelines available.",
    )
}

struct ProfileChanges {
    name: Option<String>,
    age: Option<String>,
    location: Option<String>,
    contact: Option<String>,
}

fn update_profile<W: Write>(
    store: &RecordStore,
    citizen_id: &str,
    changes: ProfileChanges,
    out: &mut W,
) -> Result<()> {
    // ---
    let mut citizens = store.load::<Citizen>();
    let found = find_by_id_mut(&mut citizens, citizen_id)
        .ok_or_else(|| CommandError::UnknownCitizen(citizen_id.to_string()))?;

    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    if let Some(name) = non_blank(changes.name) {
        found.name = name;
    }
    if let Some(age) = non_blank(changes.age) {
        found.age = age;
    }
    if let Some(location) = non_blank(changes.location) {
        found.location = location;
    }
    if let Some(contact) = non_blank(changes.contact) {
        found.contact = contact;
    }

    info!("Updated profile of {}", citizen_id);
    store.save(&citizens)?;
    writeln!(out, "Profile updated.")?;
    Ok(())
}
