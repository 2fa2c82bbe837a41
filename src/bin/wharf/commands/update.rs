//! `wharf update` command

use anyhow::{Context, Result};

use crate::cli::UpdateArgs;
use wharf::ops::{self, UpdateOptions};
use wharf::store::StoreConfig;

pub fn execute(args: UpdateArgs) -> Result<()> {
    let project_dir =
        std::env::current_dir().context("failed to get current directory")?;
    let config = StoreConfig::from_env();

    let opts = UpdateOptions {
        sync_intellij: args.intellij,
    };

    let stdout = std::io::stdout();
    ops::update(&config, &project_dir, &opts, &mut stdout.lock())
}
