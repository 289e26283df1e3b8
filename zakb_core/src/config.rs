//! Configuration of an address and how its collections are presented.
//!
//! The configuration is a TOML file like
//!
//! ```toml
//! town = "Lorsch"
//! street = "Nibelungenstraße"
//! street_nr = "3"
//! hours = 6
//! timezone = "Europe/Berlin"
//! clearances = ["R", "B", "P", "G"]
//! ```

use std::{fs, io, path::Path, time::Duration as StdDuration};

use chrono::Duration;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    clearance::Clearance,
    error::ClientError,
    garbage_client::{GarbageClient, Location, ScheduleQuery, URL},
};

pub static DEFAULT_PATH: &str = "zakb.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_url")]
    pub url: String,
    pub town: String,
    pub street: String,
    pub street_nr: String,
    /// Hours before and after the collection date an event spans.
    #[serde(default = "default_hours")]
    pub hours: u32,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_refresh_hours")]
    pub refresh_hours: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_clearances")]
    pub clearances: Vec<Clearance>,
}

fn default_url() -> String {
    String::from(URL)
}

fn default_hours() -> u32 {
    6
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Berlin
}

fn default_refresh_hours() -> u64 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_clearances() -> Vec<Clearance> {
    Clearance::ALL.to_vec()
}

impl Config {
    /// A configuration for the address with all other settings at their defaults.
    pub fn new(town: &str, street: &str, street_nr: &str) -> Self {
        Self {
            url: default_url(),
            town: String::from(town),
            street: String::from(street),
            street_nr: String::from(street_nr),
            hours: default_hours(),
            timezone: default_timezone(),
            refresh_hours: default_refresh_hours(),
            timeout_secs: default_timeout_secs(),
            clearances: default_clearances(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("town", &self.town),
            ("street", &self.street),
            ("street_nr", &self.street_nr),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }
        for (key, value) in [
            ("hours", u64::from(self.hours)),
            ("refresh_hours", self.refresh_hours),
            ("timeout_secs", self.timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be positive")));
            }
        }
        Ok(())
    }

    pub fn location(&self) -> Location {
        Location {
            town: self.town.clone(),
            street: self.street.clone(),
            street_number: self.street_nr.clone(),
        }
    }

    pub fn offset(&self) -> Duration {
        Duration::hours(i64::from(self.hours))
    }

    pub fn refresh_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.refresh_hours.saturating_mul(60 * 60))
    }

    pub fn timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.timeout_secs)
    }

    /// The query for the next collection of `clearance` with the current settings.
    pub fn query(&self, clearance: Clearance) -> ScheduleQuery {
        ScheduleQuery {
            location: self.location(),
            clearance,
            offset: self.offset(),
            timezone: self.timezone,
        }
    }

    pub fn client(&self) -> Result<GarbageClient, ClientError> {
        GarbageClient::new(&self.url, self.timeout())
    }
}
