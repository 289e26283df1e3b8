//! Print the next ZAKB collections of an address, or write them to `calendar.ics`.

use std::{collections::BTreeMap, env::current_dir, fs::write, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::error;
use zakb_core::{
    calendar::get_calendar,
    chrono_tz::Tz,
    clearance::{Clearance, ClearanceBitmask},
    config::{Config, DEFAULT_PATH},
    garbage_client::CollectionEvent,
    ical::generator::Emitter,
};

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the configuration file, `zakb.toml` if no address is given
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// the town, exactly as offered by the ZAKB form
    pub town: Option<String>,
    /// the street, exactly as offered by the ZAKB form
    pub street: Option<String>,
    /// the street number
    pub street_number: Option<String>,
    /// hours before and after the collection date
    #[arg(long)]
    pub hours: Option<u32>,
    /// the IANA timezone of the events
    #[arg(long, value_parser = parse_timezone)]
    pub timezone: Option<Tz>,
    /// exclude residual waste collections
    #[arg(long)]
    pub exclude_residual: bool,
    /// exclude organic waste collections
    #[arg(long)]
    pub exclude_organic: bool,
    /// exclude paper collections
    #[arg(long)]
    pub exclude_paper: bool,
    /// exclude yellow bag collections
    #[arg(long)]
    pub exclude_yellow: bool,
    /// write calendar.ics instead of printing the events
    #[arg(long)]
    pub ics: bool,
}

impl From<&Arguments> for ClearanceBitmask {
    fn from(value: &Arguments) -> Self {
        let mut clearance_bitmask = ClearanceBitmask::none();
        if value.exclude_residual {
            clearance_bitmask |= ClearanceBitmask::Residual;
        }
        if value.exclude_organic {
            clearance_bitmask |= ClearanceBitmask::Organic;
        }
        if value.exclude_paper {
            clearance_bitmask |= ClearanceBitmask::Paper;
        }
        if value.exclude_yellow {
            clearance_bitmask |= ClearanceBitmask::Yellow;
        }
        clearance_bitmask
    }
}

fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse().map_err(|err| format!("{err}"))
}

/// Build the configuration from the config file and the arguments overriding it.
///
/// Without `--config` and with a complete address no file is read.
fn config(args: &Arguments) -> Result<Config> {
    let mut config = match (&args.config, &args.town, &args.street, &args.street_number) {
        (None, Some(town), Some(street), Some(street_number)) => {
            Config::new(town, street, street_number)
        }
        (path, ..) => {
            let path = path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));
            Config::load(&path).with_context(|| format!("could not load {}", path.display()))?
        }
    };
    if let Some(town) = &args.town {
        config.town.clone_from(town);
    }
    if let Some(street) = &args.street {
        config.street.clone_from(street);
    }
    if let Some(street_number) = &args.street_number {
        config.street_nr.clone_from(street_number);
    }
    if let Some(hours) = args.hours {
        config.hours = hours;
    }
    if let Some(timezone) = args.timezone {
        config.timezone = timezone;
    }
    config.validate()?;
    Ok(config)
}

fn format_event(clearance: Clearance, event: Option<&CollectionEvent>, timezone: Tz) -> String {
    match event {
        Some(event) => format!(
            "{clearance}: {} - {} {}",
            event.start.with_timezone(&timezone).to_rfc3339(),
            event.end.with_timezone(&timezone).to_rfc3339(),
            event.description
        ),
        None => format!("{clearance}: none"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Arguments::parse();
    let config = config(&args)?;
    let client = config.client()?;
    let excluded_clearances = ClearanceBitmask::from(&args);
    let mut events = BTreeMap::new();
    for clearance in config
        .clearances
        .iter()
        .copied()
        .filter(|clearance| !excluded_clearances.contains(clearance.bitmask()))
    {
        match client.fetch_event(&config.query(clearance)).await {
            Ok(event) => {
                if !args.ics {
                    println!("{}", format_event(clearance, event.as_ref(), config.timezone));
                }
                events.extend(event.map(|event| (clearance, event)));
            }
            Err(err) => error!("Could not get the {} collection: {err}", clearance.label()),
        }
    }
    if args.ics {
        let calendar = get_calendar(
            &config.location(),
            config.timezone,
            &events,
            excluded_clearances,
        );
        let mut path = current_dir()?;
        path.push("calendar.ics");
        write(path, calendar.generate())?;
    }
    Ok(())
}
