//! `events` command.

use std::path::Path;

use meetupinator_api::MeetupClient;

use crate::error::CliResult;
use crate::{finder, input, writer};

/// Reads group names from `input`, fetches their upcoming events, and writes
/// them to `output` as CSV.
pub async fn run(
    client: &MeetupClient,
    input: &Path,
    output: &Path,
    weeks: Option<u32>,
) -> CliResult<()> {
    let group_names = input::read_group_names(input)?;
    let events = finder::events_for_groups(client, &group_names, weeks).await?;
    writer::write_event_file(output, &events)
}
