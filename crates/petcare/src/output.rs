//! Output formatting: table, JSON, plain.
//!
//! Table uses `tabled`, structured formats use serde, plain emits one
//! identifier per line.

use std::io::{self, Write};

use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use petcare_core::{Attributes, Flap, Hub, Pet, attr};

use crate::cli::OutputFormat;

// ── Row types ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct HubRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "LED")]
    led_mode: String,
    #[tabled(rename = "Online")]
    online: bool,
    #[tabled(rename = "Firmware")]
    firmware: String,
}

impl From<&Hub> for HubRow {
    fn from(h: &Hub) -> Self {
        Self {
            id: h.id,
            name: h.name.clone(),
            led_mode: h.led_mode.map(|m| m.to_string()).unwrap_or_default(),
            online: h.available,
            firmware: attr_text(&h.attributes, attr::FIRMWARE),
        }
    }
}

#[derive(Tabled)]
pub struct FlapRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    product: String,
    #[tabled(rename = "Lock")]
    lock: String,
    #[tabled(rename = "Battery %")]
    battery: String,
    #[tabled(rename = "Online")]
    online: bool,
    #[tabled(rename = "Last change")]
    event: String,
}

impl From<&Flap> for FlapRow {
    fn from(f: &Flap) -> Self {
        Self {
            id: f.id,
            name: f.name.clone(),
            product: f.product.to_string(),
            lock: f.lock.to_string(),
            battery: attr_text(&f.attributes, attr::BATTERY),
            online: f.available,
            event: attr_text(&f.attributes, attr::EVENT),
        }
    }
}

#[derive(Tabled)]
pub struct PetRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Since")]
    since: String,
    #[tabled(rename = "Entered")]
    entered: String,
    #[tabled(rename = "Left")]
    left: String,
}

impl From<&Pet> for PetRow {
    fn from(p: &Pet) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            location: p.location.to_string(),
            since: attr_text(&p.attributes, attr::SINCE),
            entered: attr_text(&p.attributes, attr::ENTERED),
            left: attr_text(&p.attributes, attr::LEFT),
        }
    }
}

/// Attribute value as display text; strings lose their quotes.
fn attr_text(attributes: &Attributes, key: &str) -> String {
    match attributes.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of entities in the chosen format.
pub fn render_list<'a, T, R>(
    format: OutputFormat,
    data: &'a [T],
    id_fn: impl Fn(&T) -> i64,
) -> String
where
    T: serde::Serialize,
    R: Tabled + From<&'a T>,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(R::from).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Plain => data
            .iter()
            .map(|d| id_fn(d).to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Render a single serializable value. Table format falls back to
/// pretty JSON, since detail views have no fixed columns.
pub fn render_single<T: serde::Serialize + ?Sized>(format: OutputFormat, data: &T) -> String {
    match format {
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Table | OutputFormat::Json | OutputFormat::Plain => render_json(data, false),
    }
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.expect("serialization should not fail")
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
