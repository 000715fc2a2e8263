//! oxide-fields CLI
//!
//! Command-line driver for a persisted form field collection.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_fields::prelude::*;

/// Build and inspect form field schemas.
#[derive(Parser)]
#[command(name = "oxide-fields")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the field snapshot.
    #[arg(long, env = "OXIDE_FIELDS_DIR", default_value = ".")]
    storage_dir: PathBuf,

    /// Snapshot key (file name without extension).
    #[arg(long, env = "OXIDE_FIELDS_KEY", default_value = oxide_fields::config::DEFAULT_STORAGE_KEY)]
    storage_key: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the fields in order.
    List,

    /// Append a new field.
    Add,

    /// Remove a field.
    Remove {
        /// Field id.
        id: String,
    },

    /// Move the field at FROM to index TO.
    Move {
        /// Current index.
        #[arg(allow_hyphen_values = true)]
        from: isize,
        /// Target index.
        #[arg(allow_hyphen_values = true)]
        to: isize,
    },

    /// Insert a copy of a field right after it.
    Duplicate {
        /// Field id.
        id: String,
    },

    /// Switch a field to another type, filling that type's defaults.
    SetType {
        /// Field id.
        id: String,
        /// New type (text, number, email, password, textarea, select,
        /// checkbox, date, datetime).
        field_type: String,
    },

    /// Edit attributes of a field.
    Set {
        /// Field id.
        id: String,
        /// New label.
        #[arg(long)]
        label: Option<String>,
        /// New submission key. Whitespace runs become `_`.
        #[arg(long)]
        name: Option<String>,
        /// New placeholder.
        #[arg(long)]
        placeholder: Option<String>,
        /// New helper text.
        #[arg(long)]
        helper_text: Option<String>,
        /// New comma-separated options.
        #[arg(long)]
        options: Option<String>,
        /// Whether the field is required.
        #[arg(long)]
        required: Option<bool>,
        /// Whether a select allows several choices.
        #[arg(long)]
        multiple: Option<bool>,
    },

    /// Remove every field.
    Clear,

    /// Restore the starter fields.
    Reset,

    /// Print or write the schema JSON.
    Export {
        /// Output file (stdout if not specified).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replace all fields with an imported schema.
    Import {
        /// Schema file.
        file: PathBuf,
    },

    /// Validate a JSON object of values as a form submission.
    Validate {
        /// Values file.
        values: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = StoreConfig::new()
        .persist()
        .storage_key(&cli.storage_key)
        .storage_dir(&cli.storage_dir);
    let mut store = FieldStore::from_config(&config, Arc::new(UuidAllocator::new()));

    match cli.command {
        Commands::List => print_fields(store.fields()),

        Commands::Add => {
            store.add_field();
            if let Some(field) = store.fields().as_slice().last() {
                info!("Added {} ({})", field.label, field.id);
            }
        }

        Commands::Remove { id } => {
            report(store.remove_field(&FieldId::new(id)), "Removed field");
        }

        Commands::Move { from, to } => {
            report(store.move_field(from, to), "Moved field");
        }

        Commands::Duplicate { id } => {
            let source = find(&store, &id)?.clone();
            report(store.duplicate_field(&source), "Duplicated field");
        }

        Commands::SetType { id, field_type } => {
            let id = FieldId::new(id);
            find(&store, id.as_str())?;
            report(
                store.change_type(&id, FieldType::from(field_type)),
                "Changed field type",
            );
        }

        Commands::Set {
            id,
            label,
            name,
            placeholder,
            helper_text,
            options,
            required,
            multiple,
        } => {
            let mut field = find(&store, &id)?.clone();
            if let Some(label) = label {
                field.label = label;
            }
            if let Some(name) = name {
                field.name = submission_key(&name);
            }
            if let Some(placeholder) = placeholder {
                field.placeholder = placeholder;
            }
            if let Some(helper_text) = helper_text {
                field.helper_text = helper_text;
            }
            if let Some(options) = options {
                field.options = OptionList::Text(options);
            }
            if let Some(required) = required {
                field.required = required;
            }
            if let Some(multiple) = multiple {
                field.multiple = multiple;
            }
            report(store.update_field(field), "Updated field");
        }

        Commands::Clear => report(store.clear(), "Cleared all fields"),

        Commands::Reset => report(store.reset_defaults(), "Restored default fields"),

        Commands::Export { out } => {
            let json = store.export_json()?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    info!("Wrote schema to {}", path.display());
                }
                None => println!("{json}"),
            }
        }

        Commands::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            store.import_json(&text)?;
            info!("Imported {} fields from {}", store.len(), file.display());
        }

        Commands::Validate { values } => {
            let text = tokio::fs::read_to_string(&values)
                .await
                .with_context(|| format!("failed to read {}", values.display()))?;
            let values: FormValues = serde_json::from_str(&text)
                .with_context(|| format!("{} is not a JSON object of values", values.display()))?;

            let mut session = PreviewSession::with_values(values);
            match session.submit(store.fields()) {
                Ok(submission) => println!("{}", submission.to_json()?),
                Err(errors) => {
                    eprint!("{errors}");
                    bail!("{} field(s) failed validation", errors.len());
                }
            }
        }
    }

    Ok(())
}

fn find<'a>(store: &'a FieldStore, id: &str) -> anyhow::Result<&'a FieldDefinition> {
    store
        .get(&FieldId::new(id))
        .with_context(|| format!("no field with id {id}"))
}

fn report(changed: bool, message: &str) {
    if changed {
        info!("{message}");
    } else {
        info!("Nothing changed");
    }
}

fn print_fields(fields: &FieldCollection) {
    if fields.is_empty() {
        info!("No fields yet. Use `add` to create one.");
        return;
    }

    println!("{:<4} {:<38} {:<10} {:<20} LABEL", "#", "ID", "TYPE", "NAME");
    println!("{:-<90}", "");
    for (index, field) in fields.iter().enumerate() {
        let marker = if field.required { " *" } else { "" };
        println!(
            "{:<4} {:<38} {:<10} {:<20} {}{}",
            index,
            field.id,
            field.field_type,
            field.name,
            field.label,
            marker
        );
    }
}
