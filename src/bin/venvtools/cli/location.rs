use clap::Parser;
use venvtools::{
    error::{Error, ErrorType},
    util::fs::PathUtil,
};

use super::Cli;

/// The `location` command
#[derive(Parser)]
pub struct LocationCommand {}

impl LocationCommand {
    pub fn run(&self, cli: &Cli) -> Result<i32, Error> {
        let path = cli.env_path()?;

        if !path.is_dir() {
            return Err(Error::new(ErrorType::Other(
                "There is no virtual environment".to_owned(),
            )));
        }

        println!("{}", path.str_lossy());
        Ok(0)
    }
}
