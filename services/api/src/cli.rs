use crate::demo::{
    run_defaults, run_demo, run_mapping, run_validate, DefaultsArgs, DemoArgs, MappingArgs,
    ValidateArgs,
};
use crate::server;
use assessment_scoring::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Scaled Score Configurator",
    about = "Validate, inspect and serve scaled-score assessment configurations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate a configuration document and print the error tree
    Validate(ValidateArgs),
    /// Parse a raw-to-scaled mapping file
    Mapping(MappingArgs),
    /// Print the configuration a profile selection installs
    Defaults(DefaultsArgs),
    /// Walk an editing session from profile selection to a valid configuration
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Validate(args) => run_validate(args),
        Command::Mapping(args) => run_mapping(args),
        Command::Defaults(args) => run_defaults(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
