use super::commands::DetectArgs;
use super::output::{OutputFormat, OutputFormatter};
use crate::config::DetectorConfig;
use crate::detect::{detect_tree, JavaDetector};
use crate::fs::RealFileSystem;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs `pomdetect detect`; returns the process exit code
pub fn handle_detect(args: &DetectArgs, quiet: bool) -> i32 {
    let repo_path = match args.repository_path.clone() {
        Some(path) => path,
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return 1;
            }
        },
    };

    if !repo_path.is_dir() {
        error!("Repository path is not a directory: {}", repo_path.display());
        return 1;
    }

    let repo_path: PathBuf = match repo_path.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to canonicalize repository path: {}", e);
            return 1;
        }
    };
    debug!("Canonicalized repository path: {}", repo_path.display());

    let default_config = DetectorConfig::default();
    let config = DetectorConfig {
        render_effective: args.render_effective || default_config.render_effective,
        render_timeout_secs: args
            .render_timeout
            .unwrap_or(default_config.render_timeout_secs),
        local_repository: args
            .local_repository
            .clone()
            .or(default_config.local_repository.clone()),
        ..default_config
    };

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }
    debug!("{}", config);

    let mut detector = JavaDetector::from_config(Arc::new(RealFileSystem::new()), &config);

    info!("Analyzing repository: {}", repo_path.display());
    let projects = match detect_tree(&repo_path, &mut detector) {
        Ok(projects) => projects,
        Err(e) => {
            error!("Detection failed: {:#}", e);
            return 1;
        }
    };

    let format: OutputFormat = args.format.into();
    let output = match OutputFormatter::new(format).format_projects(&projects) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {}", e);
            return 1;
        }
    };

    if let Some(output_file) = &args.output {
        match std::fs::write(output_file, &output) {
            Ok(_) => {
                info!("Output written to: {}", output_file.display());
                if !quiet {
                    println!("Output written to: {}", output_file.display());
                }
            }
            Err(e) => {
                error!("Failed to write output to file: {}", e);
                return 1;
            }
        }
    } else {
        println!("{}", output);
    }

    0
}
