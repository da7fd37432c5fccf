//! `group-id` command.

use meetupinator_api::MeetupClient;

use crate::error::CliResult;

/// Prints the id of the named group.
pub async fn run(client: &MeetupClient, name: &str) -> CliResult<()> {
    let id = client.resolve_group_id(name).await?;
    println!("{}", id);
    Ok(())
}
