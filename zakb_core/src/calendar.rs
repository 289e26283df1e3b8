//! Building iCalendar documents from collection events.

use std::{collections::BTreeMap, sync::LazyLock};

use chrono_tz::Tz;
use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_property,
};
use regex::Regex;

use crate::{
    clearance::{Clearance, ClearanceBitmask},
    garbage_client::{CollectionEvent, Location},
};

static PROD_ID: [&str; 2] = ["Abfallkalender", "zakb.de"];
static FORMAT: &str = "%Y%m%dT%H%M%S";

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Build the calendar of all events whose clearance is not excluded.
pub fn get_calendar(
    location: &Location,
    timezone: Tz,
    events: &BTreeMap<Clearance, CollectionEvent>,
    excluded_clearances: ClearanceBitmask,
) -> IcalCalendar {
    let changed = chrono::Local::now().format(FORMAT).to_string();
    let included: Vec<Clearance> = Clearance::included(excluded_clearances).collect();
    let prod_id_label = match included.as_slice() {
        [clearance] => Some(clearance.label()),
        _ => None,
    };
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(prod_id(prod_id_label))
        .build();
    for clearance in included {
        if let Some(event) = events.get(&clearance) {
            calendar
                .events
                .push(get_event(location, timezone, clearance, event, &changed));
        }
    }
    calendar
}

fn get_event(
    location: &Location,
    timezone: Tz,
    clearance: Clearance,
    event: &CollectionEvent,
    changed: &str,
) -> IcalEvent {
    let local = |instant: &chrono::DateTime<chrono::Utc>| {
        instant.with_timezone(&timezone).format(FORMAT).to_string()
    };
    IcalEventBuilder::tzid(timezone.name())
        .uid(uid(location, clearance))
        .changed(changed)
        .start(local(&event.start))
        .end(local(&event.end))
        .set(ical_property!("SUMMARY", clearance.label()))
        .set(ical_property!("DESCRIPTION", event.description.as_str()))
        .set(ical_property!(
            "LOCATION",
            format!(
                "{} {}, {}",
                location.street, location.street_number, location.town
            )
        ))
        .set(ical_property!("TRANSP", "TRANSPARENT"))
        .build()
}

fn prod_id(label: Option<&str>) -> String {
    let mut strings: Vec<&str> = vec!["-"];
    strings.extend(label);
    strings.extend(PROD_ID);
    strings.join("//")
}

/// Get a unique id for a clearance at a specific location.
///
/// Changing this function is a breaking change!
fn uid(location: &Location, clearance: Clearance) -> String {
    let [town, street, street_number] = [
        &location.town,
        &location.street,
        &location.street_number,
    ]
    .map(|part| WHITESPACE_REGEX.replace_all(part, "-").into_owned());
    format!("Abfallkalender_{town}_{street}_{street_number}_{clearance}@zakb.de")
}
