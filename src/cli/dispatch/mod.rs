use crate::cli::actions::Action;
use anyhow::Result;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        storage_root: matches
            .get_one::<PathBuf>("data-dir")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --data-dir"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_reads_port_and_data_dir() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "accesso",
            "--port",
            "9090",
            "--data-dir",
            "/tmp/accesso-data",
        ]);

        let Action::Server { port, storage_root } = handler(&matches)?;

        assert_eq!(port, 9090);
        assert_eq!(storage_root, PathBuf::from("/tmp/accesso-data"));

        Ok(())
    }
}
