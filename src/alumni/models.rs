//! Alumni record models

use crate::jobs::models::Job;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alumni {
    pub id: i64,
    pub nim: String, // student number
    pub name: String,
    pub major: String,
    pub cohort_year: i32,
    pub graduation_year: i32,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create/update body
#[derive(Debug, Clone, Deserialize)]
pub struct AlumniInput {
    #[serde(default)]
    pub nim: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub major: String,
    pub cohort_year: i32,
    pub graduation_year: i32,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl AlumniInput {
    /// Trim text fields; blank optionals become `None`
    pub fn normalized(mut self) -> Self {
        self.nim = self.nim.trim().to_string();
        self.name = self.name.trim().to_string();
        self.major = self.major.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self.address = self
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.nim.is_empty() || self.name.is_empty() || self.major.is_empty() || self.email.is_empty()
        {
            return Err("nim, name, major and email are required".to_string());
        }
        if !self.email.contains('@') {
            return Err("email is not valid".to_string());
        }
        if !(1900..=2200).contains(&self.cohort_year) {
            return Err("cohort_year is out of range".to_string());
        }
        if self.graduation_year < self.cohort_year {
            return Err("graduation_year cannot precede cohort_year".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlumniWithJobs {
    pub alumni: Alumni,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortSummary {
    pub cohort_year: i32,
    pub total: usize,
    pub alumni: Vec<Alumni>,
}
