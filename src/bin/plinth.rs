use anyhow::Result;
use plinth::cli::{actions, start};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments, initialize logging, and resolve the action to run
    let action = start()?;

    actions::run::execute(action).await
}
