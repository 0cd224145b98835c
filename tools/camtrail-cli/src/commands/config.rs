//! Print the effective configuration.

use camtrail_common::config::AppConfig;

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    println!("{}", config.to_json()?);
    Ok(())
}
