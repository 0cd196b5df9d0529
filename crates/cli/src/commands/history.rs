//! Activity history command.

use tracing::info;

use super::{CommandError, acting_super_admin, open_state};

/// Show the newest `limit` log entries.
///
/// # Errors
///
/// Returns an error if the log cannot be read.
pub async fn run(limit: usize) -> Result<(), CommandError> {
    let state = open_state().await?;
    let viewer = acting_super_admin(&state).await?;
    let entries = state.history().entries(&viewer).await?;

    for entry in entries.iter().take(limit) {
        info!(
            "{:<26} {:<12} {:<16} {}",
            entry.timestamp, entry.user, entry.action, entry.details
        );
    }
    info!("Showing {} of {} entries", entries.len().min(limit), entries.len());
    Ok(())
}
