//! This client submits the ZAKB forms and turns the calendar page into collection events.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Url};
use scraper::Html;
use serde::Serialize;

use crate::{
    clearance::Clearance,
    date,
    error::ClientError,
    form::Form,
    page::{self, CalendarCell},
};

pub static URL: &str = "https://www.zakb.de/online-service/online-service/abfallkalender/";
static FORM_SELECTOR: &str = "#athos-os-form";
static PERIOD: &str = "Die Leerungen der nächsten 4 Wochen";

/// The address whose collections are looked up.
///
/// Town and street must be spelled exactly like the options of the ZAKB forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub town: String,
    pub street: String,
    pub street_number: String,
}

/// One lookup of the next collection of a single type.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleQuery {
    pub location: Location,
    pub clearance: Clearance,
    /// Time before and after the collection date the event spans.
    pub offset: Duration,
    pub timezone: Tz,
}

/// The next collection of a type, from `offset` before to `offset` after the collection date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
}

/// Client for the ZAKB online service.
///
/// Every lookup runs in a session of its own, so lookups can run concurrently.
#[derive(Debug, Clone)]
pub struct GarbageClient {
    url: Url,
    timeout: StdDuration,
}

impl GarbageClient {
    pub fn new(url: &str, timeout: StdDuration) -> Result<Self, ClientError> {
        let url = Url::parse(url).map_err(|err| ClientError::InvalidUrl(format!("{url}: {err}")))?;
        Ok(Self { url, timeout })
    }

    fn session(&self) -> Result<Client, ClientError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }

    /// Get the next collection of the queried type.
    ///
    /// A site without the expected forms or a site which does not answer in time gives no
    /// event, just like a calendar without a collection of that type.
    pub async fn fetch_event(
        &self,
        query: &ScheduleQuery,
    ) -> Result<Option<CollectionEvent>, ClientError> {
        let html = match self.fetch_page(&query.location).await {
            Ok(html) => html,
            Err(err) if err.is_absence() => {
                warn!(
                    "Could not fetch ZAKB calendar for {}: {err}, website seems to be unavailable",
                    query.clearance
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let cells = page::highlighted_cells(&html);
        let event = find_event(&cells, query.clearance, query.offset, query.timezone)?;
        debug!("Event for {}: {event:?}", query.clearance);
        Ok(event)
    }

    /// Submit the town form and then the address form, and get the resulting calendar page.
    pub async fn fetch_page(&self, location: &Location) -> Result<String, ClientError> {
        let client = self.session()?;
        let (page_url, body) = open(client.get(self.url.clone())).await?;
        let form = {
            let mut form = Form::select(&Html::parse_document(&body), FORM_SELECTOR, &page_url)?;
            form.set_select("aos[Ort]", &location.town)?;
            form
        };
        let (page_url, body) = open(form.request(&client)).await?;
        let form = {
            let mut form = Form::select(&Html::parse_document(&body), FORM_SELECTOR, &page_url)?;
            form.set_select("aos[Strasse]", &location.street)?;
            form.set("aos[Hausnummer]", &location.street_number)?;
            form.set("aos[Hausnummerzusatz]", "")?;
            form.set("aos[Zeitraum]", PERIOD)?;
            form.set("submitAction", "nextPage")?;
            form.set("pageName", "Lageadresse")?;
            form
        };
        let (_, body) = open(form.request(&client)).await?;
        Ok(body)
    }
}

/// Send a request and get the final URL and the body of the response.
async fn open(request: RequestBuilder) -> Result<(Url, String), ClientError> {
    let response = request.send().await?;
    let url = response.url().clone();
    debug!("{} {url}", response.status());
    let body = response.text().await?;
    Ok((url, body))
}

/// Find the first collection of `clearance` in the calendar cells.
///
/// Cells are searched in page order and markers in document order, the first marker labeled
/// exactly with the clearance code wins.
pub fn find_event(
    cells: &[CalendarCell],
    clearance: Clearance,
    offset: Duration,
    timezone: Tz,
) -> Result<Option<CollectionEvent>, ClientError> {
    for cell in cells {
        let Some(marker) = cell
            .markers
            .iter()
            .find(|marker| marker.label == clearance.code())
        else {
            continue;
        };
        let description = marker
            .title
            .clone()
            .ok_or(ClientError::MissingAttribute("title of event marker"))?;
        let date_title = cell
            .date_title
            .as_deref()
            .ok_or(ClientError::MissingAttribute("title of calendar cell"))?;
        let date = date::parse_localized(date_title, timezone)?;
        return Ok(Some(CollectionEvent {
            start: date - offset,
            end: date + offset,
            description,
        }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, net::SocketAddr, time::Duration as StdDuration};

    use axum::{response::Html, routing::get, Form, Router};
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::Europe;

    use crate::{
        clearance::Clearance,
        error::ClientError,
        garbage_client::{
            find_event, CollectionEvent, GarbageClient, Location, ScheduleQuery, PERIOD, URL,
        },
        page::{highlighted_cells, CalendarCell, EventMarker},
    };

    static LOCATION_FORM: &str = include_str!("garbage_client/tests/location_form.html");
    static ADDRESS_FORM: &str = include_str!("garbage_client/tests/address_form.html");
    static RESPONSE: &str = include_str!("garbage_client/tests/response.html");
    static OFFLINE: &str = "<html><body><h1>Wartungsarbeiten</h1></body></html>";

    fn cell(date_title: &str, markers: &[(&str, &str)]) -> CalendarCell {
        CalendarCell {
            date_title: Some(String::from(date_title)),
            markers: markers
                .iter()
                .map(|(label, title)| EventMarker {
                    label: String::from(*label),
                    title: Some(String::from(*title)),
                })
                .collect(),
        }
    }

    fn location(town: &str) -> Location {
        Location {
            town: String::from(town),
            street: String::from("Nibelungenstraße"),
            street_number: String::from("3"),
        }
    }

    fn query(town: &str, clearance: Clearance) -> ScheduleQuery {
        ScheduleQuery {
            location: location(town),
            clearance,
            offset: Duration::hours(6),
            timezone: Europe::Berlin,
        }
    }

    #[test]
    fn test_find_event() {
        let cells = [cell(
            "Montag, März 4, 2024",
            &[("R", "Restmüll"), ("B", "Biomüll")],
        )];
        let event = find_event(&cells, Clearance::Residual, Duration::hours(6), Europe::Berlin)
            .unwrap()
            .unwrap();
        let expected = CollectionEvent {
            start: Europe::Berlin
                .with_ymd_and_hms(2024, 3, 3, 18, 0, 0)
                .unwrap()
                .with_timezone(&Utc),
            end: Europe::Berlin
                .with_ymd_and_hms(2024, 3, 4, 6, 0, 0)
                .unwrap()
                .with_timezone(&Utc),
            description: String::from("Restmüll"),
        };
        assert_eq!(event, expected);
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 3, 3, 17, 0, 0).unwrap());
        assert!(event.start < event.end);

        let swapped = [cell(
            "Montag, März 4, 2024",
            &[("B", "Biomüll"), ("R", "Restmüll")],
        )];
        let event = find_event(&swapped, Clearance::Residual, Duration::hours(6), Europe::Berlin)
            .unwrap()
            .unwrap();
        assert_eq!(event, expected);
    }

    #[test]
    fn test_find_event_first_match_wins() {
        let cells = [
            cell("Montag, März 4, 2024", &[("R", "Restmüll")]),
            cell("Montag, März 18, 2024", &[("R", "Restmüll später")]),
        ];
        let event = find_event(&cells, Clearance::Residual, Duration::hours(1), Europe::Berlin)
            .unwrap()
            .unwrap();
        assert_eq!(event.description, "Restmüll");
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_find_event_absent() {
        let cells = [
            cell("Montag, März 4, 2024", &[("r", "klein"), (" R", "Leerzeichen")]),
            cell("Dienstag, März 5, 2024", &[]),
        ];
        let event =
            find_event(&cells, Clearance::Residual, Duration::hours(6), Europe::Berlin).unwrap();
        assert_eq!(event, None);
        let event = find_event(&[], Clearance::Paper, Duration::hours(6), Europe::Berlin).unwrap();
        assert_eq!(event, None);
    }

    #[test]
    fn test_find_event_errors() {
        let cells = [cell("Montag, 4. März 2024", &[("G", "Gelber Sack")])];
        let result = find_event(&cells, Clearance::Yellow, Duration::hours(6), Europe::Berlin);
        assert!(matches!(result, Err(ClientError::MalformedDate(_))));

        let cells = [CalendarCell {
            date_title: Some(String::from("Montag, März 4, 2024")),
            markers: vec![EventMarker {
                label: String::from("G"),
                title: None,
            }],
        }];
        let result = find_event(&cells, Clearance::Yellow, Duration::hours(6), Europe::Berlin);
        assert!(matches!(result, Err(ClientError::MissingAttribute(_))));
    }

    #[test]
    fn test_find_event_in_response() {
        let cells = highlighted_cells(RESPONSE);
        // the organic marker of February 26 is outside the highlighted period
        let event = find_event(&cells, Clearance::Organic, Duration::hours(6), Europe::Berlin)
            .unwrap()
            .unwrap();
        assert_eq!(event.description, "Bioabfallbehälter wöchentlich");
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 3, 3, 17, 0, 0).unwrap());
        let event = find_event(&cells, Clearance::Yellow, Duration::hours(6), Europe::Berlin)
            .unwrap()
            .unwrap();
        assert_eq!(event.description, "Gelber Sack 14-täglich");
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 3, 11, 5, 0, 0).unwrap());
    }

    /// Serve a fake of the ZAKB online service and return its URL.
    ///
    /// The fake only knows the town Lorsch and checks the address form like the real site does.
    async fn spawn_fake_site(landing: &'static str) -> String {
        async fn submit(Form(fields): Form<HashMap<String, String>>) -> Html<&'static str> {
            let field = |name: &str| fields.get(name).map(String::as_str);
            if field("pageName") == Some("Lageadresse") {
                let valid = field("submitAction") == Some("nextPage")
                    && field("aos[Strasse]") == Some("Nibelungenstraße")
                    && field("aos[Hausnummer]") == Some("3")
                    && field("aos[Hausnummerzusatz]") == Some("")
                    && field("aos[Zeitraum]") == Some(PERIOD);
                return Html(if valid { RESPONSE } else { OFFLINE });
            }
            match field("aos[Ort]") {
                Some("Lorsch") => Html(ADDRESS_FORM),
                _ => Html(LOCATION_FORM),
            }
        }
        let app = Router::new().route(
            "/online-service/online-service/abfallkalender/",
            get(move || async move { Html(landing) }).post(submit),
        );
        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        format!("http://{addr}/online-service/online-service/abfallkalender/")
    }

    fn client(url: &str) -> GarbageClient {
        GarbageClient::new(url, StdDuration::from_secs(10)).unwrap()
    }

    /// Test the whole form submission against the fake site.
    #[tokio::test]
    async fn test_fetch_event() {
        let url = spawn_fake_site(LOCATION_FORM).await;
        let client = client(&url);
        let event = client
            .fetch_event(&query("Lorsch", Clearance::Paper))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.description, "Papierbehälter 4-wöchentlich");
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 3, 7, 17, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 3, 8, 5, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_fetch_event_unknown_town() {
        let url = spawn_fake_site(LOCATION_FORM).await;
        let event = client(&url)
            .fetch_event(&query("Lorch", Clearance::Residual))
            .await
            .unwrap();
        assert_eq!(event, None);
    }

    #[tokio::test]
    async fn test_fetch_event_without_form() {
        let url = spawn_fake_site(OFFLINE).await;
        let client = client(&url);
        let result = client.fetch_page(&location("Lorsch")).await;
        assert!(matches!(result, Err(ClientError::FormNotFound(_))));
        let event = client
            .fetch_event(&query("Lorsch", Clearance::Residual))
            .await
            .unwrap();
        assert_eq!(event, None);
    }

    #[tokio::test]
    async fn test_fetch_event_timeout() {
        let app = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(StdDuration::from_secs(5)).await;
                Html(LOCATION_FORM)
            }),
        );
        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);
        let client = GarbageClient::new(&format!("http://{addr}/"), StdDuration::from_millis(200))
            .unwrap();
        let result = client.fetch_page(&location("Lorsch")).await;
        assert!(matches!(result, Err(ClientError::Timeout)));
        let event = client
            .fetch_event(&query("Lorsch", Clearance::Residual))
            .await
            .unwrap();
        assert_eq!(event, None);
    }

    #[test]
    fn test_invalid_url() {
        let result = GarbageClient::new("zakb.de", StdDuration::from_secs(1));
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    /// Test whether requests can be sent to the real site.
    ///
    /// This is an online test!
    #[tokio::test]
    #[ignore = "online test"]
    async fn test_fetch_page_online() {
        let client = GarbageClient::new(URL, StdDuration::from_secs(30)).unwrap();
        let location = Location {
            town: String::from("Lorsch"),
            street: String::from("Nibelungenstraße"),
            street_number: String::from("1"),
        };
        let html = client.fetch_page(&location).await.unwrap();
        assert!(!highlighted_cells(&html).is_empty());
    }
}
