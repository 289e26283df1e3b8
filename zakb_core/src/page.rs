//! Reading the calendar table of the result page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.highlighted").unwrap());
static MARKER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.cal-event").unwrap());

/// A collection of one type on the day of its cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMarker {
    /// The full text of the marker, the clearance code.
    pub label: String,
    pub title: Option<String>,
}

/// A highlighted day of the calendar, that is a day in the requested period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    /// The German date title, e.g. `Montag, März 4, 2024`.
    pub date_title: Option<String>,
    pub markers: Vec<EventMarker>,
}

/// Collect all highlighted cells with their markers, in page order.
pub fn highlighted_cells(html: &str) -> Vec<CalendarCell> {
    let dom = Html::parse_document(html);
    dom.select(&CELL_SELECTOR).map(calendar_cell).collect()
}

fn calendar_cell(cell: ElementRef<'_>) -> CalendarCell {
    let markers = cell
        .select(&MARKER_SELECTOR)
        .map(|marker| EventMarker {
            label: marker.text().collect(),
            title: marker.value().attr("title").map(String::from),
        })
        .collect();
    CalendarCell {
        date_title: cell.value().attr("title").map(String::from),
        markers,
    }
}
