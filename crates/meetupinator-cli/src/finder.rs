//! Group names to upcoming events.

use meetupinator_api::{EventRecord, GroupId, MeetupClient};
use tracing::info;

use crate::error::CliResult;

/// Resolves every group name, then fetches the upcoming events of all of
/// them with a single request.
///
/// Names are resolved in order and the first failure aborts the run.
pub async fn events_for_groups(
    client: &MeetupClient,
    group_names: &[String],
    weeks: Option<u32>,
) -> CliResult<Vec<EventRecord>> {
    let mut group_ids: Vec<GroupId> = Vec::with_capacity(group_names.len());
    for name in group_names {
        group_ids.push(client.resolve_group_id(name).await?);
    }

    let events = client.fetch_upcoming_events(&group_ids, weeks).await?;
    info!(
        "found {} upcoming events across {} groups",
        events.len(),
        group_ids.len()
    );
    Ok(events)
}
