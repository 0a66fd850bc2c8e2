//! Fetch command implementation
//!
//! Ensures a checkout for every selected repository. Repositories are
//! processed in parallel and a failure only affects its own repository; the
//! command exits non-zero when any of them failed.

use anyhow::Result;
use clap::Args;

use super::Workspace;
use crate::cli::GlobalArgs;

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Only fetch these repositories (defaults to all configured)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

/// Execute the fetch command
pub fn execute(args: FetchArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::load(global)?;
    let specs = workspace.select(&args.names)?;

    if specs.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    let results = workspace.manager.ensure_all(&specs);
    let mut failed = 0;
    for checkout in &results {
        match &checkout.result {
            Ok(path) => println!("{} -> {}", checkout.name, path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("error: {}", e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} of {} repositories could not be checked out",
            failed,
            results.len()
        );
    }
    Ok(())
}
