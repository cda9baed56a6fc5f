//! Preference commands.

use filefly::{Identity, PreferenceValue, Store};

use crate::cli::{Format, PrefCommand};
use crate::output::print_table;

/// Run a `pref` subcommand
pub async fn run(
    store: &Store,
    command: &PrefCommand,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        PrefCommand::Get { username, key } => {
            let identity = identity_of(store, username).await?;
            match key {
                Some(key) => {
                    let value = store.preferences().get(&identity, key).await?;
                    match format {
                        Format::Human => match value {
                            Some(value) => println!("{value}"),
                            None => println!("{key} is not set"),
                        },
                        Format::Json => println!("{}", serde_json::to_string(&value)?),
                    }
                }
                None => {
                    let document = store.preferences().get_document(&identity).await?;
                    match format {
                        Format::Human => {
                            let rows: Vec<_> = document
                                .iter()
                                .map(|(k, v)| vec![k.clone(), v.to_string()])
                                .collect();
                            print_table(&["KEY", "VALUE"], &rows);
                        }
                        Format::Json => println!("{}", serde_json::to_string(&document)?),
                    }
                }
            }
        }
        PrefCommand::Set {
            username,
            key,
            value,
        } => {
            let identity = identity_of(store, username).await?;
            let value = value.as_deref().map(parse_value);
            store.preferences().set(&identity, key, value).await?;
            if format == Format::Json {
                println!("{}", serde_json::json!({ "updated": key }));
            }
        }
    }

    Ok(())
}

async fn identity_of(store: &Store, username: &str) -> Result<Identity, Box<dyn std::error::Error>> {
    let record = store
        .accounts()
        .get(username)
        .await?
        .ok_or_else(|| format!("No account named {username}"))?;
    Ok(record.identity)
}

/// `true`/`false` become booleans, finite numbers become numbers, anything else is text.
fn parse_value(raw: &str) -> PreferenceValue {
    match raw {
        "true" => PreferenceValue::Bool(true),
        "false" => PreferenceValue::Bool(false),
        _ => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => PreferenceValue::Number(n),
            _ => PreferenceValue::from(raw),
        },
    }
}
