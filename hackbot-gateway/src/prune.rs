//! One-shot cleanup of stray channels.

use tracing::{info, warn};

use crate::platform::{ChannelInfo, ChannelKind, GuildApi, PlatformError};

/// The only uncategorized channel that survives a prune.
pub const ENTRANCE_CHANNEL: &str = "entrance";

fn is_prunable(channel: &ChannelInfo) -> bool {
    matches!(channel.kind, ChannelKind::Text | ChannelKind::Voice)
        && channel.parent.is_none()
        && !channel.name.eq_ignore_ascii_case(ENTRANCE_CHANNEL)
}

/// Delete every text and voice channel outside a category, except the
/// entrance. Returns the number of channels deleted.
///
/// Listing the channels must succeed; a failed delete is logged and skipped.
pub async fn prune_uncategorized(api: &dyn GuildApi) -> Result<usize, PlatformError> {
    let mut deleted = 0;
    for channel in api.channels().await?.iter().filter(|c| is_prunable(c)) {
        match api.delete_channel(channel.id).await {
            Ok(()) => {
                info!(channel = %channel.name, id = %channel.id, "Deleted channel");
                deleted += 1;
            }
            Err(err) => warn!(channel = %channel.name, "Failed to delete channel: {}", err),
        }
    }
    info!("Pruned {} uncategorized channels", deleted);
    Ok(deleted)
}
