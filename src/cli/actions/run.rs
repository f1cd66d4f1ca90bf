use crate::cli::actions::{provision, server, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server { .. } => server::execute(action).await,
        Action::Provision { .. } => provision::execute(action).await,
    }
}
