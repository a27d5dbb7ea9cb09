use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::{AdminCommand, AlertCommand, PollutantCommand, RecordCommand, ReportCommand};
use crate::engine::{average_aqi_by_region, filter_by_region, monthly_trend};
use crate::import::read_records;
use crate::models::{AirQualityRecord, Alert, AlertStatus, Pollutant, PollutantLevels};
use crate::store::RecordStore;
use crate::table::format_mean;
use crate::util::{find_by_id_mut, gen_id, parse_float, today};

use super::{parse_level, print_rows, CommandError};

// ---

pub fn run<W: Write>(command: AdminCommand, store: &RecordStore, out: &mut W) -> Result<()> {
    // ---
    match command {
        AdminCommand::Record { command } => match command {
            RecordCommand::List => list_records(store, out),
            RecordCommand::Add {
                region,
                date,
                aqi,
                pollutants,
                health_risk,
            } => add_record(
                store,
                NewRecord {
                    region,
                    date,
                    aqi,
                    pollutants,
                    health_risk,
                },
                out,
            ),
            RecordCommand::Update {
                id,
                region,
                date,
                aqi,
                pollutants,
                health_risk,
            } => update_record(
                store,
                &id,
                RecordChanges {
                    region,
                    date,
                    aqi,
                    pollutants,
                    health_risk,
                },
                out,
            ),
            RecordCommand::Delete { id } => delete_record(store, &id, out),
        },
        AdminCommand::Pollutant { command } => match command {
            PollutantCommand::List => list_pollutants(store, out),
            PollutantCommand::Add {
                name,
                description,
                safe_limit,
            } => add_pollutant(store, &name, &description, safe_limit.as_deref(), out),
            PollutantCommand::Update {
                id,
                name,
                description,
                safe_limit,
            } => update_pollutant(store, &id, name, description, safe_limit.as_deref(), out),
            PollutantCommand::Delete { id } => delete_pollutant(store, &id, out),
        },
        AdminCommand::Import { path } => import_bulk(store, &path, out),
        AdminCommand::Report { command } => match command {
            ReportCommand::Regions => report_regions(store, out),
            ReportCommand::Trend { region } => report_trend(store, &region, out),
            ReportCommand::Alerts => list_alerts(store, out),
        },
        AdminCommand::Alert { command } => match command {
            AlertCommand::List => list_alerts(store, out),
            AlertCommand::Issue {
                region,
                level,
                expiry,
            } => issue_alert(store, &region, &level, expiry.as_deref(), out),
            AlertCommand::Withdraw { id } => withdraw_alert(store, &id, out),
        },
    }
}

// ---
// Records

struct NewRecord {
    region: String,
    date: Option<String>,
    aqi: Option<String>,
    pollutants: Vec<String>,
    health_risk: Option<String>,
}

struct RecordChanges {
    region: Option<String>,
    date: Option<String>,
    aqi: Option<String>,
    pollutants: Vec<String>,
    health_risk: Option<String>,
}

fn parse_levels(args: &[String]) -> Result<PollutantLevels, CommandError> {
    args.iter().map(|a| parse_level(a)).collect()
}

fn warn_unknown_pollutants(store: &RecordStore, levels: &PollutantLevels) {
    // ---
    let known: Vec<String> = store
        .load::<Pollutant>()
        .into_items()
        .into_iter()
        .map(|p| p.name)
        .collect();
    for name in levels.keys().filter(|n| !known.contains(*n)) {
        warn!("Pollutant '{}' is not a defined pollutant", name);
    }
}

fn list_records<W: Write>(store: &RecordStore, out: &mut W) -> Result<()> {
    // ---
    let air: Vec<AirQualityRecord> = store.load().into_items();
    let rows = air
        .iter()
        .map(|r| {
            vec![
                r.record_id.clone(),
                r.region.clone(),
                r.date.clone(),
                r.aqi.to_string(),
            ]
        })
        .collect();
    print_rows(
        out,
        rows,
        &["ID", "Region", "Date", "AQI"],
        "No air quality records available.",
    )
}

fn add_record<W: Write>(store: &RecordStore, new: NewRecord, out: &mut W) -> Result<()> {
    // ---
    let pollutants = parse_levels(&new.pollutants)?;
    warn_unknown_pollutants(store, &pollutants);

    let date = match new.date {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => today(),
    };

    let record = AirQualityRecord {
        record_id: gen_id("rec"),
        region: new.region.trim().to_string(),
        date,
        aqi: parse_float(new.aqi.as_deref().unwrap_or(""), 0.0) as i64,
        pollutants,
        health_risk: new.health_risk.unwrap_or_default(),
        extra: Default::default(),
    };

    let mut air = store.load::<AirQualityRecord>();
    let record_id = record.record_id.clone();
    info!("Adding record {} for '{}'", record_id, record.region);
    air.push(record);
    store.save(&air)?;

    writeln!(out, "Record added: {}", record_id)?;
    Ok(())
}

fn update_record<W: Write>(
    store: &RecordStore,
    id: &str,
    changes: RecordChanges,
    out: &mut W,
) -> Result<()> {
    // ---
    let levels = parse_levels(&changes.pollutants)?;
    let mut air = store.load::<AirQualityRecord>();
    let record = find_by_id_mut(&mut air, id).ok_or_else(|| CommandError::NotFound {
        kind: "Record",
        id: id.to_string(),
    })?;

    if let Some(region) = changes.region.filter(|v| !v.trim().is_empty()) {
        record.region = region.trim().to_string();
    }
    if let Some(date) = changes.date.filter(|v| !v.trim().is_empty()) {
        record.date = date.trim().to_string();
    }
    if let Some(aqi) = changes.aqi.filter(|v| !v.trim().is_empty()) {
        record.aqi = parse_float(&aqi, record.aqi as f64) as i64;
    }
    if let Some(risk) = changes.health_risk {
        record.health_risk = risk;
    }
    record.pollutants.extend(levels);

    info!("Updated record {}", id);
    store.save(&air)?;
    writeln!(out, "Updated.")?;
    Ok(())
}

fn delete_record<W: Write>(store: &RecordStore, id: &str, out: &mut W) -> Result<()> {
    // ---
    let mut air = store.load::<AirQualityRecord>();
    let before = air.len();
    air.retain(|r| r.record_id != id);
    if air.len() == before {
        return Err(CommandError::NotFound {
            kind: "Record",
            id: id.to_string(),
        }
        .into());
    }

    info!("Deleted record {}", id);
    store.save(&air)?;
    writeln!(out, "Deleted.")?;
    Ok(())
}

// ---
// Pollutants

fn list_pollutants<W: Write>(store: &RecordStore, out: &mut W) -> Result<()> {
    // ---
    let pollutants: Vec<Pollutant> = store.load().into_items();
    let rows = pollutants
        .iter()
        .map(|p| {
            vec![
                p.pollutant_id.clone(),
                p.name.clone(),
                p.description.clone(),
                p.safe_limit.to_string(),
            ]
        })
        .collect();
    print_rows(
        out,
        rows,
        &["ID", "Name", "Description", "Safe limit"],
        "No pollutants defined.",
    )
}

fn add_pollutant<W: Write>(
    store: &RecordStore,
    name: &str,
    description: &str,
    safe_limit: Option<&str>,
    out: &mut W,
) -> Result<()> {
    // ---
    let mut pollutants = store.load::<Pollutant>();
    let pollutant = Pollutant {
        pollutant_id: gen_id("pol"),
        name: name.trim().to_string(),
        description: description.trim().to_string(),
        safe_limit: parse_float(safe_limit.unwrap_or(""), 0.0),
        extra: Default::default(),
    };

    let pollutant_id = pollutant.pollutant_id.clone();
    info!("Adding pollutant {} ({})", pollutant_id, pollutant.name);
    pollutants.push(pollutant);
    store.save(&pollutants)?;

    writeln!(out, "Pollutant added: {}", pollutant_id)?;
    Ok(())
}

fn update_pollutant<W: Write>(
    store: &RecordStore,
    id: &str,
    name: Option<String>,
    description: Option<String>,
    safe_limit: Option<&str>,
    out: &mut W,
) -> Result<()> {
    // ---
    let mut pollutants = store.load::<Pollutant>();
    let pollutant = find_by_id_mut(&mut pollutants, id).ok_or_else(|| CommandError::NotFound {
        kind: "Pollutant",
        id: id.to_string(),
    })?;

    if let Some(name) = name.filter(|v| !v.trim().is_empty()) {
        pollutant.name = name.trim().to_string();
    }
    if let Some(description) = description.filter(|v| !v.trim().is_empty()) {
        pollutant.description = description.trim().to_string();
    }
    if let Some(limit) = safe_limit.filter(|v| !v.trim().is_empty()) {
        pollutant.safe_limit = parse_float(limit, 0.0);
    }

    info!("Updated pollutant {}", id);
    store.save(&pollutants)?;
    writeln!(out, "Updated.")?;
    Ok(())
}

fn delete_pollutant<W: Write>(store: &RecordStore, id: &str, out: &mut W) -> Result<()> {
    // ---
    let mut pollutants = store.load::<Pollutant>();
    pollutants.retain(|p| p.pollutant_id != id);
    store.save(&pollutants)?;
    writeln!(out, "Deleted if existed.")?;
    Ok(())
}

// ---
// Bulk import

fn import_bulk<W: Write>(store: &RecordStore, path: &Path, out: &mut W) -> Result<()> {
    // ---
    let known: Vec<String> = store
        .load::<Pollutant>()
        .into_items()
        .into_iter()
        .map(|p| p.name)
        .collect();
    let imported = read_records(path, &known, &today())?;
    let count = imported.len();

    let mut air = store.load::<AirQualityRecord>();
    air.extend(imported);
    store
        .save(&air)
        .with_context(|| format!("saving records imported from {}", path.display()))?;

    info!("Imported {} records from {}", count, path.display());
    writeln!(out, "Imported {} records.", count)?;
    Ok(())
}

// ---
// Reports

fn report_regions<W: Write>(store: &RecordStore, out: &mut W) -> Result<()> {
    // ---
    let air: Vec<AirQualityRecord> = store.load().into_items();
    let averages = average_aqi_by_region(&air);
    debug!("Region report over {} records", air.len());

    let rows = averages
        .into_iter()
        .map(|a| vec![a.region, format_mean(a.mean_aqi), a.count.to_string()])
        .collect();
    print_rows(
        out,
        rows,
        &["Region", "Average AQI", "Records"],
        "No data available.",
    )
}

fn report_trend<W: Write>(store: &RecordStore, region: &str, out: &mut W) -> Result<()> {
    // ---
    let air: Vec<AirQualityRecord> = store.load().into_items();
    let trend = monthly_trend(filter_by_region(&air, region.trim()));

    let rows = trend
        .into_iter()
        .map(|p| vec![p.key.to_string(), format_mean(p.mean_aqi)])
        .collect();
    print_rows(out, rows, &["Month", "Avg AQI"], "No data for that region.")
}

// ---
// Alerts

fn list_alerts<W: Write>(store: &RecordStore, out: &mut W) -> Result<()> {
    // ---
    let alerts: Vec<Alert> = store.load().into_items();
    let rows = alerts
        .iter()
        .map(|a| {
            vec![
                a.alert_id.clone(),
                a.region.clone(),
                a.aqi_level.clone(),
                a.status.as_str().to_string(),
                a.issue_date.clone(),
            ]
        })
        .collect();
    print_rows(
        out,
        rows,
        &["ID", "Region", "AQI_level", "Status", "Issue date"],
        "No alerts.",
    )
}

fn issue_alert<W: Write>(
    store: &RecordStore,
    region: &str,
    level: &str,
    expiry: Option<&str>,
    out: &mut W,
) -> Result<()> {
    // ---
    let mut alerts = store.load::<Alert>();
    let alert = Alert {
        alert_id: gen_id("alert"),
        region: region.trim().to_string(),
        aqi_level: level.trim().to_string(),
        status: AlertStatus::Active,
        issue_date: today(),
        expiry_date: expiry.unwrap_or_default().trim().to_string(),
        extra: Default::default(),
    };

    let alert_id = alert.alert_id.clone();
    info!("Issuing alert {} for '{}'", alert_id, alert.region);
    alerts.push(alert);
    store.save(&alerts)?;

    writeln!(out, "Alert issued: {}", alert_id)?;
    Ok(())
}

fn withdraw_alert<W: Write>(store: &RecordStore, id: &str, out: &mut W) -> Result<()> {
    // ---
    let mut alerts = store.load::<Alert>();
    let alert = find_by_id_mut(&mut alerts, id).ok_or_else(|| CommandError::NotFound {
        kind: "Alert",
        id: id.to_string(),
    })?;
    alert.status = AlertStatus::Withdrawn;

    info!("Withdrew alert {}", id);
    store.save(&alerts)?;
    writeln!(out, "Alert withdrawn.")?;
    Ok(())
}
