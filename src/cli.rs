//! CLI mode implementation
//!
//! The argument structs double as HTTP query-string extractors, so a
//! `seniors-api query --degree MCA` run and a `GET /seniors?degree=MCA`
//! request go through the same parsing.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Seniors placement roster service
#[derive(Parser)]
#[command(name = "seniors-api")]
#[command(about = "Read-only query service over alumni placement rosters", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (JSON)
    #[arg(long, global = true, env = "SENIORS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the roster source files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default when no arguments are given)
    Serve(ServeArgs),
    /// Filter the roster and print matching records
    Query(QueryArgs),
    /// Look up a single record by roll number
    Get(GetArgs),
    /// Ranked search on student names
    Search(SearchArgs),
    /// List the values available for the filter dropdowns
    Filters(DatasetArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Bind address host
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Load every configured dataset before accepting requests
    #[arg(long)]
    pub preload: bool,
}

/// Composite roster query
#[derive(Args, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct QueryArgs {
    /// Free text matched against name, organization, program and roll number
    #[arg(short = 'q', long = "text")]
    #[serde(default)]
    pub q: Option<String>,

    /// Exact program, e.g. "B.Tech." (case-insensitive)
    #[arg(short, long)]
    #[serde(default)]
    pub degree: Option<String>,

    /// "On campus" or "Off campus"
    #[arg(short, long)]
    #[serde(default)]
    pub campus_type: Option<String>,

    /// Exact organization name (case-insensitive)
    #[arg(short, long)]
    #[serde(default)]
    pub org: Option<String>,

    /// Minimum package in lakhs per annum (inclusive)
    #[arg(long)]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub min_package: Option<f64>,

    /// Maximum package in lakhs per annum (inclusive)
    #[arg(long)]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub max_package: Option<f64>,

    /// Dataset key, e.g. 2020-2023
    #[arg(short = 'y', long)]
    #[serde(default)]
    pub academic_year: Option<String>,
}

/// Dataset selector shared by lookup and filter listing
#[derive(Args, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DatasetArgs {
    /// Dataset key, e.g. 2020-2023
    #[arg(short = 'y', long)]
    #[serde(default)]
    pub academic_year: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct GetArgs {
    /// Roll number, compared exactly
    pub roll_no: String,

    #[command(flatten)]
    pub dataset: DatasetArgs,
}

/// Name search
#[derive(Args, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchArgs {
    /// Name fragment, at least 2 characters
    #[arg(short, long)]
    pub name: String,

    /// Maximum number of results (default 50, max 200)
    #[arg(short, long)]
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<usize>,

    /// Dataset key, e.g. 2020-2023
    #[arg(short = 'y', long)]
    #[serde(default)]
    pub academic_year: Option<String>,
}

/// Deserialize an optional value where an empty string means absent
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
