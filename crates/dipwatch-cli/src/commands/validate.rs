use super::common;
use dipwatch_application::config::{load_config, to_toml_pretty};
use std::path::PathBuf;

pub(super) fn run_validate(config_path: PathBuf) -> Result<(), String> {
    let config = load_config(&config_path)?;
    config.validate()?;
    common::print_config_summary("validate", &config, Some(&config_path));

    let watchlist = config.watchlist()?;
    println!("config ok: {} ticker(s)", watchlist.len());
    println!("resolved config:\n{}", to_toml_pretty(&config)?);
    Ok(())
}
