//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use medstock_core::{FilterSet, Record, ResourceSpec, SortDirection, SortSpec, TableView};

use crate::cli::{ListArgs, WriteArgs};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the action is refused.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Run `fut` behind a stderr spinner. Hidden when quiet or not a terminal.
pub async fn with_spinner<F, T>(message: String, quiet: bool, fut: F) -> T
where
    F: Future<Output = T>,
{
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    };
    let out = fut.await;
    bar.finish_and_clear();
    out
}

/// Translate list flags into a table view: query, filters, then one
/// header click per `--sort`. `--desc` pins the final key descending.
pub fn build_view(spec: &ResourceSpec, args: &ListArgs) -> Result<TableView, CliError> {
    let mut view = TableView::for_resource(spec);

    if let Some(ref query) = args.search {
        view.set_query(query.as_str());
    }
    for raw in &args.filter {
        let (field, value) = FilterSet::parse_assignment(raw).map_err(|e| CliError::Validation {
            field: "filter".into(),
            reason: e.to_string(),
        })?;
        view.set_filter(field, value);
    }
    for key in &args.sort {
        view.click_header(key);
    }
    if args.desc {
        if let Some(key) = args.sort.last() {
            view.set_sort(SortSpec::new(key.as_str(), SortDirection::Desc));
        }
    }
    Ok(view)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Request body from `--from-file`, with repeated `--set FIELD=VALUE`
/// laid over it.
pub fn build_body(args: &WriteArgs) -> Result<Record, CliError> {
    let mut body = match args.from_file {
        Some(ref path) => {
            Record::try_from(read_json_file(path)?).map_err(|e| CliError::Validation {
                field: "from-file".into(),
                reason: format!("expected a JSON object: {e}"),
            })?
        }
        None => Record::new(),
    };

    let mut overrides = Record::new();
    for raw in &args.set {
        let (field, value) = FilterSet::parse_assignment(raw).map_err(|e| CliError::Validation {
            field: "set".into(),
            reason: e.to_string(),
        })?;
        overrides.insert(field, value);
    }
    body.merge(overrides);
    Ok(body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use medstock_core::{Resource, resource};
    use serde_json::json;

    use super::*;
    use crate::cli::{Cli, Command, RecordsCommand};

    fn list_args(args: &[&str]) -> ListArgs {
        let mut argv = vec!["medstock", "items", "list"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Items(records) => match records.command {
                RecordsCommand::List(list) => list,
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    fn write_args(args: &[&str]) -> WriteArgs {
        let mut argv = vec!["medstock", "items", "create"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Items(records) => match records.command {
                RecordsCommand::Create(body) => body,
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn repeated_sort_toggles_like_header_clicks() {
        let spec = resource::spec(Resource::Items);
        let view = build_view(spec, &list_args(&["--sort", "name", "--sort", "name"])).unwrap();
        assert_eq!(view.sort_spec(), &SortSpec::new("name", SortDirection::Desc));

        let view = build_view(spec, &list_args(&["--sort", "name", "--sort", "id"])).unwrap();
        assert_eq!(view.sort_spec(), &SortSpec::new("id", SortDirection::Asc));
    }

    #[test]
    fn desc_pins_the_last_key() {
        let spec = resource::spec(Resource::Items);
        let view = build_view(spec, &list_args(&["--sort", "quantity", "--desc"])).unwrap();
        assert_eq!(view.sort_spec(), &SortSpec::new("quantity", SortDirection::Desc));
    }

    #[test]
    fn filters_and_query_land_in_the_view() {
        let spec = resource::spec(Resource::Items);
        let view = build_view(
            spec,
            &list_args(&["--search", " Gauze ", "-f", "categoryName=PPE", "-f", "quantity=5"]),
        )
        .unwrap();
        assert_eq!(view.query(), " Gauze ");
        assert_eq!(view.filters().get("categoryName").into_owned(), json!("PPE"));
        assert_eq!(view.filters().get("quantity").into_owned(), json!(5));
    }

    #[test]
    fn malformed_filter_is_a_usage_error() {
        let spec = resource::spec(Resource::Items);
        let err = build_view(spec, &list_args(&["-f", "nonsense"])).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }), "got {err:?}");
    }

    #[test]
    fn body_from_set_assignments() {
        let body = build_body(&write_args(&["--set", "name=Gauze", "--set", "quantity=10"])).unwrap();
        assert_eq!(body.get("name"), Some(&json!("Gauze")));
        assert_eq!(body.get("quantity"), Some(&json!(10)));
    }

    #[test]
    fn body_from_file_must_be_an_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "Saline", "unit": "bag"}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_owned();
        let body = build_body(&write_args(&["--from-file", path.as_str()])).unwrap();
        assert_eq!(body.display("unit"), "bag");

        let mut list = tempfile::NamedTempFile::new().unwrap();
        write!(list, "[1, 2]").unwrap();
        let path = list.path().to_str().unwrap().to_owned();
        let err = build_body(&write_args(&["--from-file", path.as_str()])).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }), "got {err:?}");
    }

    #[test]
    fn set_overrides_fields_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "Saline", "unit": "bag", "quantity": 4}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_owned();
        let body = build_body(&write_args(&[
            "--from-file",
            path.as_str(),
            "--set",
            "quantity=12",
        ]))
        .unwrap();
        assert_eq!(body.get("quantity"), Some(&json!(12)));
        assert_eq!(body.display("name"), "Saline");
        assert_eq!(body.len(), 3);
    }
}
