use crate::domain::{Record, Response, Series};
use crate::gateway::DemandReading;

const INDENT: &str = "    ";

pub fn render(response: &Response, delimiter: &str) -> String {
    match response {
        Response::Record(record) => render_record(record),
        Response::Series(series) => render_series(series, delimiter),
    }
}

/// Section names, each followed by its fields in two aligned columns.
pub fn render_record(record: &Record) -> String {
    let key_width = record
        .sections()
        .flat_map(|(_, fields)| fields.names())
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (section, fields) in record.sections() {
        lines.push(section.to_string());
        for (name, value) in fields.iter() {
            lines.push(format!("{}{:<width$} {}", INDENT, name, value, width = key_width));
        }
    }
    lines.join("\n")
}

/// One row per sample, headed by the field names of the first non-empty sample.
pub fn render_series(series: &Series, delimiter: &str) -> String {
    let mut samples = series.samples().iter().filter(|sample| !sample.is_empty());
    let Some(first) = samples.next() else {
        return String::new();
    };
    let header: Vec<&str> = first.names().collect();

    let mut lines = vec![header.join(delimiter)];
    for sample in std::iter::once(first).chain(samples) {
        let row: Vec<String> = header
            .iter()
            .map(|name| sample.get(name).map(ToString::to_string).unwrap_or_default())
            .collect();
        lines.push(row.join(delimiter));
    }
    lines.join("\n")
}

pub fn render_demand(reading: &DemandReading) -> String {
    let timestamp = reading.timestamp.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_string());
    format!("{} {} kW", timestamp, reading.kilowatts)
}
