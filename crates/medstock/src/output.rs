//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables are built
//! from a resource's column layout, structured formats use serde, plain
//! emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use medstock_core::{Column, Record, ResourceSpec, SortSpec, Summary, Tone};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Paint text in the terminal color for a tone.
pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match tone {
        Tone::Success => text.green().to_string(),
        Tone::Warning => text.yellow().to_string(),
        Tone::Danger => text.red().to_string(),
        Tone::Info => text.cyan().to_string(),
        Tone::Accent => text.magenta().to_string(),
        Tone::Muted => text.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable items in the chosen format.
///
/// - `table`: `table_fn` builds the whole table from the slice
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T>(
    format: &OutputFormat,
    data: &[T],
    table_fn: impl FnOnce(&[T]) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => table_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Record tables ────────────────────────────────────────────────────

/// Text of one cell: code columns show their classified label.
pub fn cell(record: &Record, column: &Column, color: bool) -> String {
    match (column.classifier(), record.value(column.key)) {
        (Some(classifier), Some(raw)) => {
            let class = classifier.classify(Some(raw));
            paint(class.label, class.tone, color)
        }
        _ => record.display(column.key),
    }
}

/// Column title with the sort arrow when the view is sorted by it.
pub fn header(column: &Column, sort: &SortSpec) -> String {
    if sort.is_sorted_by(column.key) {
        format!("{} {}", column.title, sort.direction.arrow())
    } else {
        column.title.to_owned()
    }
}

/// One row per record, one column per entry of the resource layout.
pub fn record_table(spec: &ResourceSpec, rows: &[Record], sort: &SortSpec, color: bool) -> String {
    if rows.is_empty() {
        return format!("No {} match.", spec.resource.label().to_lowercase());
    }
    let mut builder = Builder::default();
    builder.push_record(spec.columns.iter().map(|c| header(c, sort)));
    for record in rows {
        builder.push_record(spec.columns.iter().map(|c| cell(record, c, color)));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Two-column field/value view of every field on one record.
pub fn record_detail(spec: &ResourceSpec, record: &Record, color: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, _) in record.iter() {
        let title = spec.column(key).map_or(key, |c| c.title);
        let value = spec
            .column(key)
            .map_or_else(|| record.display(key), |c| cell(record, c, color));
        builder.push_record([title.to_owned(), value]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// `Showing 3 of 6 · 2 distinct categoryName`
pub fn summary_line(summary: &Summary) -> String {
    let mut line = format!("Showing {} of {}", summary.shown, summary.total);
    for (field, n) in &summary.distinct {
        line.push_str(&format!(" · {n} distinct {field}"));
    }
    line
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let out = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    out.unwrap_or_else(|e| format!("<serialization failed: {e}>"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("<serialization failed: {e}>"))
}
