//! Record predicates for the composite roster query
//!
//! All filters are pure and combined as a conjunction. They are checked in
//! a fixed order (text, degree, campus, organization, compensation) which
//! only affects how early a record is rejected.

use crate::cli::QueryArgs;
use crate::error::AppError;
use crate::store::record::{FieldIndex, Record};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Placement channel; matched by presence of the corresponding indicator column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CampusType {
    #[serde(rename = "On campus")]
    OnCampus,
    #[serde(rename = "Off campus")]
    OffCampus,
}

impl CampusType {
    pub const ALL: [CampusType; 2] = [CampusType::OnCampus, CampusType::OffCampus];

    pub fn label(&self) -> &'static str {
        match self {
            CampusType::OnCampus => "On campus",
            CampusType::OffCampus => "Off campus",
        }
    }

    fn indicator(&self, fields: &FieldIndex) -> Option<usize> {
        match self {
            CampusType::OnCampus => fields.on_campus,
            CampusType::OffCampus => fields.off_campus,
        }
    }
}

impl fmt::Display for CampusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CampusType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CampusType::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "campus_type must be \"On campus\" or \"Off campus\", got {:?}",
                    s
                ))
            })
    }
}

/// Optional query criteria. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub text: Option<String>,
    pub degree: Option<String>,
    pub campus_type: Option<CampusType>,
    pub organization: Option<String>,
    pub min_compensation: Option<f64>,
    pub max_compensation: Option<f64>,
}

impl TryFrom<&QueryArgs> for Criteria {
    type Error = AppError;

    fn try_from(args: &QueryArgs) -> Result<Self, Self::Error> {
        let campus_type = non_blank(&args.campus_type)
            .map(|c| c.parse::<CampusType>())
            .transpose()?;

        Ok(Criteria {
            text: non_blank(&args.q),
            degree: non_blank(&args.degree),
            campus_type,
            organization: non_blank(&args.org),
            min_compensation: args.min_package,
            max_compensation: args.max_package,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

/// Criteria with needles pre-normalised for matching
#[derive(Debug)]
pub struct Filter {
    text: Option<String>,
    degree: Option<String>,
    campus_type: Option<CampusType>,
    organization: Option<String>,
    min_compensation: Option<f64>,
    max_compensation: Option<f64>,
}

impl Filter {
    pub fn new(criteria: &Criteria) -> Self {
        Self {
            text: criteria
                .text
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .map(str::to_lowercase),
            degree: normalized(criteria.degree.as_deref()),
            campus_type: criteria.campus_type,
            organization: normalized(criteria.organization.as_deref()),
            min_compensation: criteria.min_compensation,
            max_compensation: criteria.max_compensation,
        }
    }

    pub fn matches(&self, record: &Record, fields: &FieldIndex) -> bool {
        self.matches_text(record, fields)
            && equals_normalized(self.degree.as_deref(), record, fields.program)
            && self.matches_campus(record, fields)
            && equals_normalized(self.organization.as_deref(), record, fields.organization)
            && self.matches_compensation(record, fields)
    }

    fn matches_text(&self, record: &Record, fields: &FieldIndex) -> bool {
        let Some(needle) = self.text.as_deref() else {
            return true;
        };
        [fields.name, fields.organization, fields.program, fields.identifier]
            .into_iter()
            .filter_map(|pos| record.at(pos).as_text())
            .any(|hay| hay.to_lowercase().contains(needle))
    }

    fn matches_campus(&self, record: &Record, fields: &FieldIndex) -> bool {
        match self.campus_type {
            None => true,
            Some(campus) => record.at(campus.indicator(fields)).is_present(),
        }
    }

    fn matches_compensation(&self, record: &Record, fields: &FieldIndex) -> bool {
        if self.min_compensation.is_none() && self.max_compensation.is_none() {
            return true;
        }
        let Some(value) = record.at(fields.compensation).as_f64() else {
            return false;
        };
        self.min_compensation.map_or(true, |min| value >= min)
            && self.max_compensation.map_or(true, |max| value <= max)
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Case-insensitive, trimmed equality. Null cells never match a needle.
fn equals_normalized(needle: Option<&str>, record: &Record, position: Option<usize>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    record
        .at(position)
        .as_text()
        .map_or(false, |hay| hay.trim().to_lowercase() == needle)
}
