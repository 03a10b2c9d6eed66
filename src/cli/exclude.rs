use npm_exclude::config::Config;
use npm_exclude::core::path::resolve_against;
use npm_exclude::core::{ExcludeError, ExcludeResult};
use npm_exclude::exclude::{ExclusionRequest, RunResult, StagingCoordinator};
use std::env;
use std::path::{Path, PathBuf};

/// Options gathered from the command line
#[derive(Debug, Clone, Default)]
pub struct ExcludeOptions {
    pub modules: Vec<String>,
    pub update: bool,
    pub production: bool,
    pub verbose: bool,
    pub module_dir: Option<PathBuf>,
    pub tmp_dir: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub npm: Option<String>,
    pub npm_args: Vec<String>,
}

impl ExcludeOptions {
    fn subcommand(&self) -> &'static str {
        if self.update {
            "update"
        } else {
            "install"
        }
    }
}

/// Turn CLI options plus config into a request; flags win over config
pub fn build_request(options: &ExcludeOptions, config: &Config, cwd: &Path) -> ExcludeResult<ExclusionRequest> {
    if options.production && options.update {
        return Err(ExcludeError::Validation(
            "--production cannot be used with --update".to_string(),
        ));
    }

    let module_dir = options
        .module_dir
        .clone()
        .unwrap_or_else(|| config.get_module_dir());
    let manifest = options
        .manifest
        .clone()
        .unwrap_or_else(|| config.get_manifest());
    let tmp_dir = options
        .tmp_dir
        .clone()
        .unwrap_or_else(|| config.get_tmp_dir());
    let npm = options
        .npm
        .clone()
        .unwrap_or_else(|| config.npm_binary.clone());

    let mut args = vec![options.subcommand().to_string()];
    args.extend(config.npm_args_for(options.verbose));
    if options.production {
        args.push("--production".to_string());
    }
    args.extend(options.npm_args.iter().cloned());

    Ok(ExclusionRequest::new(
        resolve_against(cwd, &module_dir),
        resolve_against(cwd, &manifest),
        options.modules.clone(),
    )
    .with_temp_root(resolve_against(cwd, &tmp_dir))
    .with_command(npm, args)
    .with_cwd(cwd))
}

pub async fn run(options: ExcludeOptions) -> ExcludeResult<()> {
    let current_dir = env::current_dir()
        .map_err(|e| ExcludeError::Path(format!("Failed to get current directory: {}", e)))?;
    let config = Config::load().unwrap_or_default();

    let request = build_request(&options, &config, &current_dir)?;
    let result = StagingCoordinator::default().run(&request).await?;

    report(&result)
}

/// Print the outcome and map it to the error that decides the exit status
fn report(result: &RunResult) -> ExcludeResult<()> {
    for name in &result.skipped {
        eprintln!("  Skipped {}: not installed", name);
    }

    if !result.staging_errors.is_empty() {
        eprintln!("\n⚠️  Some modules could not be excluded:");
        for err in &result.staging_errors {
            eprintln!("  {}", err);
        }
    }

    if result.command_succeeded {
        println!("The npm command was executed successfully.");
    } else {
        match result.exit_code {
            Some(code) => eprintln!("The npm command failed with exit code {}.", code),
            None => eprintln!("The npm command could not be run."),
        }
    }

    if !result.is_restored() {
        eprintln!("\n❌ Restore failed. Your project may not be in its original state:");
        for err in &result.restore_errors {
            eprintln!("  {}", npm_exclude::format_error_with_help(err));
        }
        for staged in &result.staged {
            if staged.staged_path.exists() {
                eprintln!(
                    "  {} is still at {}",
                    staged.original_path.display(),
                    staged.staged_path.display()
                );
            }
        }
    }

    if !result.command_succeeded {
        return Err(ExcludeError::SubprocessExit(
            result.exit_code.filter(|code| *code != 0).unwrap_or(1),
        ));
    }

    match result.restore_errors.first() {
        Some(_) => Err(ExcludeError::Restore(Box::new(ExcludeError::Path(format!(
            "{} restore step(s) failed",
            result.restore_errors.len()
        ))))),
        None => Ok(()),
    }
}
