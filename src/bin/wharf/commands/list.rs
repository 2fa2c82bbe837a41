//! `wharf list` command

use anyhow::{Context, Result};

use wharf::ops;
use wharf::store::StoreConfig;

pub fn execute() -> Result<()> {
    let project_dir =
        std::env::current_dir().context("failed to get current directory")?;
    let config = StoreConfig::from_env();

    let stdout = std::io::stdout();
    ops::list(&config, &project_dir, &mut stdout.lock())
}
