use clap::Parser;
use log::{info, warn};
use venvtools::{
    error::Error,
    util::fs::{remove_dir_all, PathUtil},
};

use super::Cli;

/// The `remove` command
#[derive(Parser)]
pub struct RemoveCommand {}

impl RemoveCommand {
    pub fn run(&self, cli: &Cli) -> Result<i32, Error> {
        let path = cli.env_path()?;

        if path.is_dir() {
            info!("Removing virtual env: {}", path.str_lossy());
            remove_dir_all(&path)?;
        } else {
            warn!("There is no virtual env to remove");
        }

        Ok(0)
    }
}
