//! Account management commands.

use filefly::{AccountRecord, Store};

use crate::cli::{AccountCommand, Format};
use crate::output::{ACCOUNT_HEADERS, account_json, account_row, print_table};

/// Run an `account` subcommand
pub async fn run(
    store: &Store,
    command: &AccountCommand,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let accounts = store.accounts();

    match command {
        AccountCommand::Create {
            username,
            password,
            admin,
            skip_policy,
        } => {
            let identity = accounts
                .create(username, &password.value, *admin, *skip_policy)
                .await?;
            match format {
                Format::Human => println!("Created {username} ({identity})"),
                Format::Json => println!(
                    "{}",
                    serde_json::json!({ "username": username, "identity": identity })
                ),
            }
        }
        AccountCommand::Delete { username } => {
            accounts.delete(username).await?;
            match format {
                Format::Human => println!("Deleted {username}"),
                Format::Json => println!("{}", serde_json::json!({ "deleted": username })),
            }
        }
        AccountCommand::List => {
            let records = accounts.list_accounts().await?;
            print_accounts(&records, format)?;
        }
        AccountCommand::Show { username } => {
            let record = accounts
                .get(username)
                .await?
                .ok_or_else(|| format!("No account named {username}"))?;
            print_accounts(std::slice::from_ref(&record), format)?;
        }
        AccountCommand::Verify { username, password } => {
            accounts
                .verify_credentials(username, &password.value)
                .await?;
            let record = accounts.record_login(username).await?;
            match format {
                Format::Human => println!("Credentials accepted for {username}"),
                Format::Json => println!("{}", account_json(&record)?),
            }
        }
        AccountCommand::Passwd {
            username,
            password,
            skip_policy,
        } => {
            accounts
                .set_password(username, &password.value, *skip_policy)
                .await?;
            match format {
                Format::Human => println!("Changed password of {username}"),
                Format::Json => println!("{}", serde_json::json!({ "updated": username })),
            }
        }
    }

    Ok(())
}

fn print_accounts(records: &[AccountRecord], format: Format) -> Result<(), serde_json::Error> {
    match format {
        Format::Human => {
            if records.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }
            let rows: Vec<_> = records.iter().map(account_row).collect();
            print_table(&ACCOUNT_HEADERS, &rows);
        }
        Format::Json => {
            for record in records {
                println!("{}", account_json(record)?);
            }
        }
    }
    Ok(())
}
