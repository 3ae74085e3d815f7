//! Request payloads and their schema rules.
//!
//! Every field is optional at the wire level so that a missing field is
//! reported as a validation failure naming it, the same way an invalid
//! value is.

use std::fmt;

use ipnet::IpNet;
use serde::Deserialize;
use sparoo_core::error::{SparooError, SparooResult};
use sparoo_core::models::instance::DatabaseEngine;
use uuid::Uuid;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const LOCATION_MIN: usize = 2;
const DESCRIPTION_MAX: usize = 300;

/// Body of an instance creation request.
#[derive(Clone, Default, Deserialize)]
pub struct CreateInstanceRequest {
    pub instance_name: Option<String>,
    pub database_type: Option<String>,
    pub enable_backups: Option<bool>,
    pub admin_password: Option<String>,
    /// Comma-separated CIDR list, e.g. `"10.0.0.0/8, 192.168.1.0/24"`.
    pub allow_cidrs: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
}

impl fmt::Debug for CreateInstanceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateInstanceRequest")
            .field("instance_name", &self.instance_name)
            .field("database_type", &self.database_type)
            .field("enable_backups", &self.enable_backups)
            .field("admin_password", &"<redacted>")
            .field("allow_cidrs", &self.allow_cidrs)
            .field("organization", &self.organization)
            .field("project", &self.project)
            .finish()
    }
}

/// A creation request that passed every schema rule.
#[derive(Clone)]
pub struct ValidatedInstanceRequest {
    pub name: String,
    pub engine: DatabaseEngine,
    pub enable_backups: bool,
    pub admin_password: String,
    pub allow_cidrs: Vec<String>,
    pub organization_id: Uuid,
    pub project_id: Uuid,
}

impl CreateInstanceRequest {
    /// Apply the schema rules, stopping at the first offending field.
    pub fn validate(&self, min_password_length: usize) -> SparooResult<ValidatedInstanceRequest> {
        let name = required("instance_name", &self.instance_name)?;
        check_length("instance_name", name, NAME_MIN, NAME_MAX)?;
        if name
            .chars()
            .any(|c| c.is_control() || matches!(c, '\u{2028}' | '\u{2029}'))
        {
            return Err(SparooError::validation(
                "instance_name",
                "must not contain control characters",
            ));
        }

        let database_type = required("database_type", &self.database_type)?;
        let engine = database_type.parse::<DatabaseEngine>().map_err(|_| {
            SparooError::validation(
                "database_type",
                format!(
                    "must be one of {}",
                    DatabaseEngine::ALL.map(|e| e.as_str()).join(", ")
                ),
            )
        })?;

        let enable_backups = self
            .enable_backups
            .ok_or_else(|| SparooError::validation("enable_backups", "is required"))?;

        let admin_password = required("admin_password", &self.admin_password)?;
        if admin_password.chars().count() < min_password_length {
            return Err(SparooError::validation(
                "admin_password",
                format!("must be at least {min_password_length} characters"),
            ));
        }

        let allow_cidrs = parse_allow_cidrs(required("allow_cidrs", &self.allow_cidrs)?)?;
        let organization_id = parse_id("organization", &self.organization)?;
        let project_id = parse_id("project", &self.project)?;

        Ok(ValidatedInstanceRequest {
            name: name.to_string(),
            engine,
            enable_backups,
            admin_password: admin_password.to_string(),
            allow_cidrs,
            organization_id,
            project_id,
        })
    }
}

/// Split a comma-separated CIDR list into distinct ranges.
///
/// Entries are trimmed; an empty or unparsable entry rejects the whole
/// list. Repeated ranges keep their first position.
pub fn parse_allow_cidrs(raw: &str) -> SparooResult<Vec<String>> {
    let mut cidrs: Vec<String> = Vec::new();
    for (index, entry) in raw.split(',').map(str::trim).enumerate() {
        if entry.is_empty() {
            return Err(SparooError::validation(
                "allow_cidrs",
                format!("entry {} is empty", index + 1),
            ));
        }
        if entry.parse::<IpNet>().is_err() {
            return Err(SparooError::validation(
                "allow_cidrs",
                format!("`{entry}` is not a valid CIDR range"),
            ));
        }
        if !cidrs.iter().any(|c| c == entry) {
            cidrs.push(entry.to_string());
        }
    }
    Ok(cidrs)
}

/// Body of an organization creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrganizationRequest {
    pub org_name: Option<String>,
    pub location: Option<String>,
}

impl CreateOrganizationRequest {
    /// Returns `(name, location)`.
    pub fn validate(&self) -> SparooResult<(String, String)> {
        let name = required("org_name", &self.org_name)?;
        check_length("org_name", name, NAME_MIN, NAME_MAX)?;
        let location = required("location", &self.location)?;
        check_length("location", location, LOCATION_MIN, NAME_MAX)?;
        Ok((name.to_string(), location.to_string()))
    }
}

/// Body of a project creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CreateProjectRequest {
    /// Returns `(name, description)`; a missing description is empty.
    pub fn validate(&self) -> SparooResult<(String, String)> {
        let name = required("name", &self.name)?;
        check_length("name", name, NAME_MIN, NAME_MAX)?;
        let description = self.description.clone().unwrap_or_default();
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(SparooError::validation(
                "description",
                format!("must be at most {DESCRIPTION_MAX} characters"),
            ));
        }
        Ok((name.to_string(), description))
    }
}

fn required<'a>(field: &str, value: &'a Option<String>) -> SparooResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SparooError::validation(field, "is required")),
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> SparooResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(SparooError::validation(
            field,
            format!("must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

fn parse_id(field: &str, value: &Option<String>) -> SparooResult<Uuid> {
    let raw = required(field, value)?;
    Uuid::parse_str(raw).map_err(|_| SparooError::validation(field, "must be a UUID"))
}
