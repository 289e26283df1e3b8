//! This crate fetches the waste collection dates of the ZAKB (Zweckverband Abfallwirtschaft
//! Kreis Bergstraße) for a single address and turns them into calendar events.
//!
//! The dates are read from <https://www.zakb.de/online-service/online-service/abfallkalender/>
//! by submitting the town form and the address form of the online service.

pub use chrono_tz;
pub use ical;

pub mod calendar;
pub mod clearance;
pub mod config;
pub mod date;
pub mod error;
pub mod form;
pub mod garbage_client;
pub mod page;
