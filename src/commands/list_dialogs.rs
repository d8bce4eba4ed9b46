//! List every channel, group and chat visible to the account.

use grammers_client::Client;

use crate::config::Config;
use crate::error::Result;
use crate::session::{get_client, SessionLock};
use crate::telegram::{peer_id, peer_kind, peer_title};

const NO_NAME: &str = "(No name)";
const NO_USERNAME: &str = "(No username)";
const TABLE_WIDTH: usize = 85;

/// One row of the dialog table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRow {
    pub id: i64,
    pub kind: String,
    pub name: Option<String>,
    pub username: Option<String>,
}

pub async fn run() -> Result<()> {
    let config = Config::new();
    config.require_credentials()?;

    let _lock = SessionLock::acquire(&config)?;
    let client = get_client(&config).await?;

    tracing::info!("Fetching your dialogs...");
    let rows = fetch_dialogs(&client).await?;
    print!("{}", render_table(&rows));

    Ok(())
}

async fn fetch_dialogs(client: &Client) -> Result<Vec<DialogRow>> {
    let mut rows = Vec::new();
    let mut dialogs = client.iter_dialogs();

    while let Some(dialog) = dialogs.next().await? {
        let peer = &dialog.peer;
        rows.push(DialogRow {
            id: peer_id(peer),
            kind: peer_kind(peer).to_string(),
            name: peer_title(peer),
            username: peer.username().map(str::to_string),
        });
    }

    Ok(rows)
}

/// Fixed-width table: header, separator, one line per dialog.
pub fn render_table(rows: &[DialogRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{:<15} {:<20} {:<30} {:<20}\n",
        "ID", "Type", "Name", "Username"
    ));
    out.push_str(&"-".repeat(TABLE_WIDTH));
    out.push('\n');

    for row in rows {
        let name = row
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(NO_NAME);
        let username = row
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(NO_USERNAME);
        out.push_str(&format!(
            "{:<15} {:<20} {:<30} {:<20}\n",
            row.id, row.kind, name, username
        ));
    }

    out
}
