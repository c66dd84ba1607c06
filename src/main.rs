use anyhow::Result;
use clap::Parser;
use oometrics::cli::{init_logging, Cli, Commands};
use oometrics::commands::{self, AnalyzeArgs, AnalyzeConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        command @ Commands::Analyze { .. } => handle_analyze_command(command),
        Commands::Init { force } => {
            init_logging(0);
            commands::init_config(force)
        }
    }
}

fn handle_analyze_command(command: Commands) -> Result<()> {
    let Commands::Analyze {
        path,
        source,
        package,
        scope,
        root_type,
        format,
        output,
        verbosity,
        jobs,
        no_parallel,
        plain,
        config,
    } = command
    else {
        anyhow::bail!("Invalid command");
    };

    init_logging(verbosity);

    let args = AnalyzeArgs {
        path,
        source,
        package,
        scope,
        root_type,
        format,
        output,
        jobs,
        no_parallel,
        plain,
        config,
    };
    let file_config = commands::load_file_config(args.config.as_deref())?;
    commands::handle_analyze(AnalyzeConfig::resolve(args, &file_config))
}
