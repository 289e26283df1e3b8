//! Filling and submitting HTML forms the way a browser does.
//!
//! A [`Form`] is read from a parsed page, its fields are changed with [`Form::set`] and
//! [`Form::set_select`] and it is turned into a request with [`Form::request`].

use reqwest::{Client, RequestBuilder, Url};
use scraper::{ElementRef, Html, Selector};

use crate::error::ClientError;

/// Elements which are never submitted unless they are the clicked button.
static UNSUBMITTED_INPUT_TYPES: [&str; 4] = ["submit", "image", "button", "reset"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldKind {
    Input,
    /// One radio button of a group sharing the field name.
    Radio { value: String },
    Select { options: Vec<String> },
    TextArea,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    kind: FieldKind,
    /// `None` for fields which are not submitted, like an unchecked checkbox.
    value: Option<String>,
}

/// A form read from a page, detached from the page it was read from.
#[derive(Debug, Clone)]
pub struct Form {
    method: Method,
    action: Url,
    fields: Vec<Field>,
}

impl Form {
    /// Read the first form matching `selector` from `html`.
    ///
    /// The form action is resolved against `page_url`, the URL the page was loaded from.
    pub fn select(html: &Html, selector: &str, page_url: &Url) -> Result<Self, ClientError> {
        let form_selector = parse_selector(selector)?;
        let Some(form) = html.select(&form_selector).next() else {
            return Err(ClientError::FormNotFound(format!("no form {selector}")));
        };
        let action = match form.value().attr("action").map(str::trim) {
            None | Some("") => page_url.clone(),
            Some(action) => page_url
                .join(action)
                .map_err(|err| ClientError::FormNotFound(format!("form action {action}: {err}")))?,
        };
        let method = match form.value().attr("method") {
            Some(method) if method.eq_ignore_ascii_case("post") => Method::Post,
            _ => Method::Get,
        };
        let field_selector = parse_selector("input, select, textarea")?;
        let fields = form.select(&field_selector).filter_map(field).collect();
        Ok(Self {
            method,
            action,
            fields,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn action(&self) -> &Url {
        &self.action
    }

    /// Choose the option `value` of the select `name`.
    ///
    /// The option must be offered by the select, values are compared exactly.
    pub fn set_select(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name && matches!(field.kind, FieldKind::Select { .. }))
            .ok_or_else(|| ClientError::FormNotFound(format!("no select {name}")))?;
        field.choose(value)
    }

    /// Set the field `name` to `value`, whatever kind of field it is.
    ///
    /// Selects only accept values of their options. For a radio group the radio with `value`
    /// is checked and all others of the group are unchecked.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        if self
            .fields
            .iter()
            .any(|field| field.name == name && matches!(field.kind, FieldKind::Radio { .. }))
        {
            return self.check_radio(name, value);
        }
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| ClientError::FormNotFound(format!("no field {name}")))?;
        field.choose(value)
    }

    fn check_radio(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        let offered = self.fields.iter().any(|field| {
            field.name == name
                && matches!(&field.kind, FieldKind::Radio { value: radio_value } if radio_value == value)
        });
        if !offered {
            return Err(ClientError::FormNotFound(format!(
                "no radio {value:?} for {name}"
            )));
        }
        for field in self.fields.iter_mut().filter(|field| field.name == name) {
            if let FieldKind::Radio { value: radio_value } = &field.kind {
                field.value = (radio_value == value).then(|| radio_value.clone());
            }
        }
        Ok(())
    }

    /// The name/value pairs a browser would submit, in document order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|field| Some((field.name.clone(), field.value.clone()?)))
            .collect()
    }

    /// Build the request submitting this form.
    pub fn request(&self, client: &Client) -> RequestBuilder {
        let pairs = self.pairs();
        match self.method {
            Method::Get => client.get(self.action.clone()).query(&pairs),
            Method::Post => client.post(self.action.clone()).form(&pairs),
        }
    }
}

impl Field {
    fn choose(&mut self, value: &str) -> Result<(), ClientError> {
        if let FieldKind::Select { options } = &self.kind {
            if !options.iter().any(|option| option == value) {
                return Err(ClientError::FormNotFound(format!(
                    "no option {value:?} for select {}",
                    self.name
                )));
            }
        }
        self.value = Some(value.to_owned());
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ClientError> {
    Selector::parse(selector)
        .map_err(|err| ClientError::FormNotFound(format!("invalid selector {selector}: {err}")))
}

fn field(element: ElementRef<'_>) -> Option<Field> {
    let name = element.value().attr("name").filter(|name| !name.is_empty())?;
    let (kind, value) = match element.value().name() {
        "select" => select_field(element),
        "textarea" => (FieldKind::TextArea, Some(element.text().collect())),
        _ => {
            let input_type = element
                .value()
                .attr("type")
                .unwrap_or("text")
                .to_ascii_lowercase();
            if UNSUBMITTED_INPUT_TYPES.contains(&input_type.as_str()) {
                return None;
            }
            let checked = element.value().attr("checked").is_some();
            let value_or_on = element.value().attr("value").unwrap_or("on").to_owned();
            match input_type.as_str() {
                "radio" => {
                    let value = checked.then(|| value_or_on.clone());
                    (FieldKind::Radio { value: value_or_on }, value)
                }
                "checkbox" => (FieldKind::Input, checked.then_some(value_or_on)),
                _ => (
                    FieldKind::Input,
                    Some(element.value().attr("value").unwrap_or_default().to_owned()),
                ),
            }
        }
    };
    Some(Field {
        name: name.to_owned(),
        kind,
        value,
    })
}

fn select_field(element: ElementRef<'_>) -> (FieldKind, Option<String>) {
    let Ok(option_selector) = Selector::parse("option") else {
        return (FieldKind::Select { options: vec![] }, None);
    };
    let mut options = vec![];
    let mut selected = None;
    for option in element.select(&option_selector) {
        let value = option
            .value()
            .attr("value")
            .map_or_else(|| option.text().collect::<String>().trim().to_owned(), String::from);
        if selected.is_none() && option.value().attr("selected").is_some() {
            selected = Some(value.clone());
        }
        options.push(value);
    }
    let value = selected.or_else(|| options.first().cloned());
    (FieldKind::Select { options }, value)
}
