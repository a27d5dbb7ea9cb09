//! Command-line surface of `airq`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// ---

#[derive(Debug, Parser)]
#[command(name = "airq", author, version, about = "Air quality records, reports and citizen lookups", long_about = None)]
pub struct Cli {
    /// Data directory holding the JSON collections (overrides AIRQ_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Administrator operations; requires the admin credentials
    Admin {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Register as a new citizen
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: Option<String>,
        /// Region used for current air quality lookups
        #[arg(long, default_value = "")]
        location: String,
        /// Email or phone
        #[arg(long, default_value = "")]
        contact: String,
    },
    /// Citizen operations for a registered citizen id
    Citizen {
        /// Citizen id, e.g. cit_alice
        #[arg(long)]
        id: String,
        #[command(subcommand)]
        command: CitizenCommand,
    },
    /// Recreate the sample data set, replacing every collection
    Seed,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Manage air quality records
    Record {
        #[command(subcommand)]
        command: RecordCommand,
    },
    /// Manage pollutant definitions
    Pollutant {
        #[command(subcommand)]
        command: PollutantCommand,
    },
    /// Import records from a .json or .csv file
    Import {
        path: PathBuf,
    },
    /// Aggregate reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Manage alerts
    Alert {
        #[command(subcommand)]
        command: AlertCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecordCommand {
    /// List every record
    List,
    /// Add a record
    Add {
        #[arg(long)]
        region: String,
        /// YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Numeric AQI; non-numeric input counts as 0
        #[arg(long)]
        aqi: Option<String>,
        /// Pollutant level, repeatable
        #[arg(long = "pollutant", value_name = "NAME=VALUE")]
        pollutants: Vec<String>,
        #[arg(long)]
        health_risk: Option<String>,
    },
    /// Update fields of a record
    Update {
        id: String,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        aqi: Option<String>,
        #[arg(long = "pollutant", value_name = "NAME=VALUE")]
        pollutants: Vec<String>,
        #[arg(long)]
        health_risk: Option<String>,
    },
    /// Delete a record
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum PollutantCommand {
    /// List pollutant definitions
    List,
    /// Add a pollutant
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        safe_limit: Option<String>,
    },
    /// Update fields of a pollutant
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        safe_limit: Option<String>,
    },
    /// Delete a pollutant if it exists
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Regions ranked by average AQI
    Regions,
    /// Monthly average AQI for one region
    Trend {
        region: String,
    },
    /// Every alert with its status
    Alerts,
}

#[derive(Debug, Subcommand)]
pub enum AlertCommand {
    /// List alerts
    List,
    /// Issue a new active alert dated today
    Issue {
        #[arg(long)]
        region: String,
        /// Severity label, e.g. "Very Unhealthy"
        #[arg(long)]
        level: String,
        /// YYYY-MM-DD, advisory only
        #[arg(long)]
        expiry: Option<String>,
    },
    /// Mark an alert as withdrawn
    Withdraw {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum CitizenCommand {
    /// Latest reading and active alerts for your region
    Current,
    /// Search historical readings
    Search(SearchArgs),
    /// Monthly trend for your region
    Trends,
    /// Health guidelines by AQI range
    Guidelines,
    /// Update your profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        contact: Option<String>,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct SearchArgs {
    /// Exact date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    /// Region, case-insensitive
    #[arg(long)]
    pub region: Option<String>,
    /// Records that measured this pollutant
    #[arg(long)]
    pub pollutant: Option<String>,
    /// Latest reading of every region
    #[arg(long)]
    pub latest: bool,
}
