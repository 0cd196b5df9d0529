//! Sales report command.

use std::io::Write;

use stockroom_core::Period;

use super::{CommandError, open_state};

/// Print the text report for a period to stdout.
///
/// # Errors
///
/// Returns an error for an unknown period or if the report cannot be built.
pub async fn run(period: &str) -> Result<(), CommandError> {
    let period: Period = period
        .parse()
        .map_err(|e: stockroom_core::PeriodError| CommandError::InvalidArgument(e.to_string()))?;

    let state = open_state().await?;
    let now = state.now();
    let report = state.dashboard().report(period, now).await?;
    let text = report
        .render_text(now)
        .map_err(|e| CommandError::Render(e.to_string()))?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}
