use crate::{api, cli::actions::Action, config::Config};
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, storage_root } => {
            let config = Config::new(storage_root);

            api::serve(port, config).await?;
        }
    }

    Ok(())
}
