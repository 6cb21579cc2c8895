use tracing::debug;

use crate::error::Result;
use crate::host::{BlockContainer, Notification, Notifier, SCHEDULE_BLOCK_TYPE};
use crate::schedule::ScheduleDocument;

/// Inserts a copy of `snapshot` right after the host's current block
///
/// Returns the index of the new block.
pub fn duplicate_snapshot(
    snapshot: &ScheduleDocument,
    host: &mut dyn BlockContainer,
    notifier: &dyn Notifier,
) -> Result<usize> {
    let index = host.current_block_index() + 1;
    let data = serde_json::to_value(snapshot)?;
    host.insert_block(SCHEDULE_BLOCK_TYPE, data, None, index)?;
    debug!(index, "duplicated schedule block");
    notifier.notify(Notification::success("Block duplicated!"));
    Ok(index)
}
