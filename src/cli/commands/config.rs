use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use std::path::Path;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, path: &Path) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        init,
        force,
    } = cmd
    {
        if *init {
            Config::write_default(path, *force)?;
            success(format!("Config file: {}", path.display()));
        }

        if *print_config {
            let cfg = Config::load(Some(path))?;
            info(format!("Current configuration ({}):", path.display()));
            print!("{}", cfg.to_yaml()?);
        }

        if !*init && !*print_config {
            println!("{}", path.display());
        }
    }

    Ok(())
}
