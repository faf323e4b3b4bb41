use crate::config::DetectorConfig;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Maven multi-module resolution and platform resource inference
#[derive(Parser, Debug)]
#[command(
    name = "pomdetect",
    about = "Resolve Maven multi-module projects and infer the platform resources they need",
    version,
    long_about = "pomdetect parses every pom.xml in a repository, reconstructs the parent and \
                  aggregator hierarchy, resolves effective dependency versions through managed \
                  dependencies and BOM imports, and classifies the result into required \
                  databases, message queues, event streams and storage."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect Java projects and their resource requirements",
        long_about = "Walks a repository, resolves every runnable Maven module and reports its \
                      effective dependencies and inferred resources.\n\n\
                      Examples:\n  \
                      pomdetect detect\n  \
                      pomdetect detect /path/to/repo\n  \
                      pomdetect detect --format json\n  \
                      pomdetect detect --render-effective --render-timeout 120"
    )]
    Detect(DetectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to repository (defaults to current directory)"
    )]
    pub repository_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        long,
        help = "Render effective descriptors with Maven before falling back to local resolution"
    )]
    pub render_effective: bool,

    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = DetectorConfig::parse_timeout,
        help = "Timeout for each Maven render (overrides POMDETECT_RENDER_TIMEOUT)"
    )]
    pub render_timeout: Option<u64>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Local Maven repository for BOM imports and external parents"
    )]
    pub local_repository: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_detect_args() {
        let args = CliArgs::parse_from(["pomdetect", "detect"]);
        let Commands::Detect(detect_args) = args.command;
        assert_eq!(detect_args.format, OutputFormatArg::Human);
        assert!(!detect_args.render_effective);
        assert!(detect_args.render_timeout.is_none());
        assert!(detect_args.local_repository.is_none());
        assert!(detect_args.repository_path.is_none());
    }

    #[test]
    fn test_detect_with_options() {
        let args = CliArgs::parse_from([
            "pomdetect",
            "detect",
            "/tmp/repo",
            "--format",
            "json",
            "--render-effective",
            "--render-timeout",
            "120",
            "--local-repository",
            "/opt/m2",
            "-o",
            "out.json",
        ]);

        let Commands::Detect(detect_args) = args.command;
        assert_eq!(detect_args.repository_path, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(detect_args.format, OutputFormatArg::Json);
        assert!(detect_args.render_effective);
        assert_eq!(detect_args.render_timeout, Some(120));
        assert_eq!(detect_args.local_repository, Some(PathBuf::from("/opt/m2")));
        assert_eq!(detect_args.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = CliArgs::try_parse_from(["pomdetect", "detect", "--render-timeout", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["pomdetect", "-v", "detect"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["pomdetect", "--log-level", "debug", "detect", "-q"]);
        assert!(args.quiet);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["pomdetect", "-v", "-q", "detect"]).is_err());
    }
}
