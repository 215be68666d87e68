use cloudpack::cli::commands::{CliArgs, Commands};
use cloudpack::cli::handlers::{handle_build, handle_config, handle_inspect};
use cloudpack::util::logging::{init_logging, LoggingConfig};
use cloudpack::VERSION;

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("cloudpack v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args, args.quiet),
        Commands::Inspect(inspect_args) => handle_inspect(inspect_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}
