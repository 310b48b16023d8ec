// src/handlers/mod.rs
use serde::Deserialize;

use crate::models::{ParsePeriodError, Period};

pub mod dashboard;
pub mod error;
pub mod health;
pub mod returns;

/// Input values used when the request leaves a field out.
#[derive(Debug, Clone)]
pub struct ShellDefaults {
    pub symbol: String,
    pub period: Period,
}

/// `?symbol=...&period=...`, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub symbol: Option<String>,
    pub period: Option<String>,
}

impl AnalyzeQuery {
    pub fn symbol_or(&self, defaults: &ShellDefaults) -> String {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.symbol.as_str())
            .to_string()
    }

    pub fn period_or(&self, defaults: &ShellDefaults) -> Result<Period, ParsePeriodError> {
        match self.period.as_deref().map(str::trim) {
            None | Some("") => Ok(defaults.period),
            Some(raw) => raw.parse(),
        }
    }
}
