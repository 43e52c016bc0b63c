use anyhow::Result;
use clap::Parser;
use std::process;

use distpack::cmd::CommandFailed;
use distpack::config::Config;
use distpack::pipeline;
use distpack::toolchain::MissingTool;

/// Exit code when a required external tool is missing from PATH.
const EXIT_MISSING_TOOL: i32 = 2;

/// Build and package release binaries for every supported target.
///
/// Takes no arguments: the manifest path, output directory, and target
/// list are fixed. Run from the project root.
#[derive(Parser, Debug)]
#[command(name = "distpack", version, about)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    if let Err(e) = run() {
        eprintln!("[distpack] error: {e:#}");
        process::exit(exit_code_for(&e));
    }
}

fn run() -> Result<()> {
    let config = Config::from_project_root(".");
    pipeline::run(&config)?;
    Ok(())
}

/// Map the error taxonomy onto process exit codes: a missing tool gets
/// the dedicated code, a failed subprocess propagates its own exit code,
/// anything else is 1.
fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<MissingTool>().is_some() {
        EXIT_MISSING_TOOL
    } else if let Some(failed) = error.downcast_ref::<CommandFailed>() {
        failed.code.unwrap_or(1)
    } else {
        1
    }
}
