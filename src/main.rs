use clap::Parser;
use npm_exclude::core::ExcludeError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

/// Exit status for invalid invocations (matches clap's usage errors)
const EXIT_USAGE: u8 = 2;

/// Exit status when the command succeeded but the project could not be restored
const EXIT_RESTORE_FAILED: u8 = 3;

#[derive(Parser)]
#[command(name = "npm-exclude")]
#[command(about = "Run npm install/update while temporarily hiding installed modules")]
#[command(version)]
struct Cli {
    /// Modules to hide from npm (directory names under the module directory)
    #[arg(required = true, value_name = "MODULE")]
    modules: Vec<String>,

    /// Run `npm install` (default)
    #[arg(short, long, conflicts_with = "update")]
    install: bool,

    /// Run `npm update`
    #[arg(short, long)]
    update: bool,

    /// Pass --production to npm (install only)
    #[arg(long, conflicts_with = "update")]
    production: bool,

    /// Let npm log at its default level instead of `--loglevel warn`
    #[arg(short, long)]
    verbose: bool,

    /// Module directory (defaults to ./node_modules)
    #[arg(long, value_name = "DIR")]
    module_dir: Option<PathBuf>,

    /// Where excluded modules are kept while npm runs (defaults to <os temp>/npmExclude)
    #[arg(long, value_name = "DIR")]
    tmp_dir: Option<PathBuf>,

    /// Manifest file (defaults to ./package.json)
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// npm executable to run
    #[arg(long, env = "NPM_EXCLUDE_NPM", value_name = "BIN")]
    npm: Option<String>,

    /// Extra arguments passed to npm, after `--`
    #[arg(last = true, value_name = "NPM_ARGS")]
    npm_args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = cli::exclude::run(cli::exclude::ExcludeOptions {
        modules: cli.modules,
        update: cli.update && !cli.install,
        production: cli.production,
        verbose: cli.verbose,
        module_dir: cli.module_dir,
        tmp_dir: cli.tmp_dir,
        manifest: cli.manifest,
        npm: cli.npm,
        npm_args: cli.npm_args,
    })
    .await;

    // Handle result and exit codes
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match &e {
            ExcludeError::SubprocessExit(code) => {
                // npm already printed its own output
                ExitCode::from(u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1))
            }
            ExcludeError::Validation(_) => {
                eprintln!("\n{}", npm_exclude::format_error_with_help(&e));
                ExitCode::from(EXIT_USAGE)
            }
            ExcludeError::Restore(_) => {
                // Details were printed by the report
                ExitCode::from(EXIT_RESTORE_FAILED)
            }
            _ => {
                eprintln!("\n{}", npm_exclude::format_error_with_help(&e));
                ExitCode::FAILURE
            }
        },
    }
}
