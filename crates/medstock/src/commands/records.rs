//! Record command handlers, shared by every resource.

use medstock_core::{CoreError, Inventory, Record, Resource, SortSpec, resource};

use crate::cli::{GlobalOpts, ListArgs, RecordsArgs, RecordsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    inventory: &Inventory,
    resource: Resource,
    args: RecordsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RecordsCommand::List(list) => list_records(inventory, resource, &list, global).await,

        RecordsCommand::Get { id } => {
            let spec = resource::spec(resource);
            let record = inventory
                .get(resource, &id)
                .await
                .map_err(|e| not_found_hint(e, resource, &id))?;
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &record,
                |r| output::record_detail(spec, r, color),
                |r| r.id().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RecordsCommand::Search { query } => {
            if resource.search_path().is_none() {
                return Err(CliError::Unsupported {
                    operation: format!("{resource} search"),
                });
            }
            let rows = util::with_spinner(
                format!("Searching {}", resource.label().to_lowercase()),
                global.quiet,
                inventory.search_remote(resource, &query),
            )
            .await?;
            print_rows(resource, &rows, &SortSpec::unsorted(), global);
            Ok(())
        }

        RecordsCommand::Create(body) => {
            ensure_writable(resource, "create")?;
            let record = util::build_body(&body)?;
            inventory.create(resource, &record).await?;
            if !global.quiet {
                eprintln!("✓ Created record in {resource}");
            }
            Ok(())
        }

        RecordsCommand::Update { id, body } => {
            ensure_writable(resource, "update")?;
            let record = util::build_body(&body)?;
            inventory
                .update(resource, &id, &record)
                .await
                .map_err(|e| not_found_hint(e, resource, &id))?;
            if !global.quiet {
                eprintln!("✓ Updated {resource} record {id}");
            }
            Ok(())
        }

        RecordsCommand::Delete { id } => {
            ensure_writable(resource, "delete")?;
            if !util::confirm(
                &format!("{resource} delete"),
                &format!("Delete {resource} record {id}?"),
                global.yes,
            )? {
                return Ok(());
            }
            inventory
                .delete(resource, &id)
                .await
                .map_err(|e| not_found_hint(e, resource, &id))?;
            if !global.quiet {
                eprintln!("✓ Deleted {resource} record {id}");
            }
            Ok(())
        }
    }
}

// ── List ────────────────────────────────────────────────────────────

async fn list_records(
    inventory: &Inventory,
    resource: Resource,
    list: &ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if list.storage.is_some() && resource != Resource::ItemLots {
        return Err(CliError::Validation {
            field: "storage".into(),
            reason: "--storage only applies to lots".into(),
        });
    }

    // Bad flags fail before any request goes out.
    let spec = resource::spec(resource);
    let view = util::build_view(spec, list)?;

    let message = format!("Fetching {}", resource.label().to_lowercase());
    let all = match list.storage.as_deref() {
        Some(storage_id) => {
            util::with_spinner(message, global.quiet, inventory.list_storage_lots(storage_id))
                .await?
        }
        None => util::with_spinner(message, global.quiet, inventory.list(resource)).await?,
    };

    let shown = view.apply(&all);
    tracing::debug!(%resource, total = all.len(), shown = shown.len(), "view applied");
    print_rows(resource, &shown, view.sort_spec(), global);

    if list.summary && !global.quiet {
        eprintln!("{}", output::summary_line(&view.summary(&all, &shown)));
    }
    Ok(())
}

fn print_rows(resource: Resource, rows: &[Record], sort: &SortSpec, global: &GlobalOpts) {
    let spec = resource::spec(resource);
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        rows,
        |rows| output::record_table(spec, rows, sort, color),
        |r| r.id().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
}

// ── Helpers ─────────────────────────────────────────────────────────

fn ensure_writable(resource: Resource, operation: &str) -> Result<(), CliError> {
    if resource.is_writable() {
        Ok(())
    } else {
        Err(CliError::Unsupported {
            operation: format!("{resource} {operation}"),
        })
    }
}

/// Point not-found errors at this resource's own list command.
fn not_found_hint(err: CoreError, resource: Resource, id: &str) -> CliError {
    match err {
        CoreError::NotFound { .. } => CliError::NotFound {
            resource_type: resource.label().to_owned(),
            identifier: id.to_owned(),
            list_command: format!("{resource} list"),
        },
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn read_only_resources_refuse_writes() {
        assert!(ensure_writable(Resource::Items, "create").is_ok());
        let err = ensure_writable(Resource::LotStorageRequests, "delete").unwrap_err();
        assert_eq!(err.to_string(), "Operation 'lot-requests delete' is not available");
    }

    #[test]
    fn not_found_uses_the_cli_name() {
        let err = not_found_hint(
            CoreError::NotFound {
                resource: "Requested".into(),
                identifier: "no such row".into(),
            },
            Resource::StorageCategories,
            "42",
        );
        match err {
            CliError::NotFound {
                resource_type,
                identifier,
                list_command,
            } => {
                assert_eq!(resource_type, "Storage Categories");
                assert_eq!(identifier, "42");
                assert_eq!(list_command, "categories list");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
