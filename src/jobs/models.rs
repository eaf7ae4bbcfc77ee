//! Employment history models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStatus {
    Active,
    Ended,
    Resigned,
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Active => "active",
            EmploymentStatus::Ended => "ended",
            EmploymentStatus::Resigned => "resigned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EmploymentStatus::Active),
            "ended" => Some(EmploymentStatus::Ended),
            "resigned" => Some(EmploymentStatus::Resigned),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: i64,
    pub alumni_id: i64,
    pub company_name: String,
    pub position: String,
    pub industry: String,
    pub location: String,
    pub salary_range: Option<String>,
    pub started_on: String,
    pub ended_on: Option<String>,
    pub employment_status: EmploymentStatus,
    pub description: Option<String>,
    pub deleted_at: Option<String>,
    pub deleted_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Job {
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

fn default_status() -> EmploymentStatus {
    EmploymentStatus::Active
}

/// Create/update body. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobInput {
    pub alumni_id: i64,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    pub salary_range: Option<String>,
    #[serde(default)]
    pub started_on: String,
    pub ended_on: Option<String>,
    #[serde(default = "default_status")]
    pub employment_status: EmploymentStatus,
    pub description: Option<String>,
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl JobInput {
    pub fn normalized(mut self) -> Self {
        self.company_name = self.company_name.trim().to_string();
        self.position = self.position.trim().to_string();
        self.industry = self.industry.trim().to_string();
        self.location = self.location.trim().to_string();
        self.started_on = self.started_on.trim().to_string();
        self.salary_range = trim_optional(self.salary_range);
        self.ended_on = trim_optional(self.ended_on);
        self.description = trim_optional(self.description);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.company_name.is_empty()
            || self.position.is_empty()
            || self.industry.is_empty()
            || self.location.is_empty()
        {
            return Err("company_name, position, industry and location are required".to_string());
        }

        let started = NaiveDate::parse_from_str(&self.started_on, DATE_FORMAT)
            .map_err(|_| "started_on must be a YYYY-MM-DD date".to_string())?;

        if let Some(ended_on) = &self.ended_on {
            let ended = NaiveDate::parse_from_str(ended_on, DATE_FORMAT)
                .map_err(|_| "ended_on must be a YYYY-MM-DD date".to_string())?;
            if ended < started {
                return Err("ended_on cannot precede started_on".to_string());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> JobInput {
        serde_json::from_value(serde_json::json!({
            "alumni_id": 1,
            "company_name": " Acme ",
            "position": "Backend Engineer",
            "industry": "Software",
            "location": "Jakarta",
            "started_on": "2024-02-01",
            "ended_on": ""
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_and_normalize() {
        let input = input().normalized();
        assert_eq!(input.company_name, "Acme");
        assert_eq!(input.employment_status, EmploymentStatus::Active);
        assert_eq!(input.ended_on, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_dates_validated() {
        let mut bad = input().normalized();
        bad.started_on = "01/02/2024".to_string();
        assert!(bad.validate().is_err());

        let mut bad = input().normalized();
        bad.ended_on = Some("2023-12-31".to_string());
        assert!(bad.validate().is_err());

        let mut ok = input().normalized();
        ok.ended_on = Some("2024-02-01".to_string());
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_status_strings() {
        for status in [
            EmploymentStatus::Active,
            EmploymentStatus::Ended,
            EmploymentStatus::Resigned,
        ] {
            assert_eq!(EmploymentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(EmploymentStatus::from_str("fired"), None);
    }
}
