use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Generates Kubernetes manifests and a Dockerfile from service source code
#[derive(Parser, Debug)]
#[command(
    name = "cloudpack",
    about = "Generates Kubernetes manifests and a Dockerfile from service source code",
    version,
    author,
    long_about = "cloudpack reads the syntax tree of a service module, recognizes its listeners, \
                  services and scheduled tasks, and writes the matching Kubernetes manifests and \
                  Dockerfile. Per-project settings are taken from Cloud.toml."
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
        about = "Generate deployment artifacts",
        long_about = "Extracts the deployment intent from a syntax tree, applies Cloud.toml \
                      overrides and writes the artifacts under <output>/kubernetes and \
                      <output>/docker.\n\n\
                      Examples:\n  \
                      cloudpack build tree.json --artifact target/bin/hello.jar\n  \
                      cloudpack build tree.yaml --artifact hello.jar --cloud docker\n  \
                      cloudpack build tree.json --artifact hello.jar --cloud-toml conf/Cloud.toml"
    )]
    Build(BuildArgs),

    #[command(
        about = "Print the extracted deployment intent",
        long_about = "Extracts listeners, services and the task schedule from a syntax tree \
                      and prints them without generating anything.\n\n\
                      Examples:\n  \
                      cloudpack inspect tree.json\n  \
                      cloudpack inspect tree.json --format yaml"
    )]
    Inspect(InspectArgs),

    #[command(
        about = "Show the effective tool configuration",
        long_about = "Prints the configuration resolved from CLOUDPACK_* environment variables.\n\n\
                      Examples:\n  \
                      cloudpack config\n  \
                      cloudpack config --format json"
    )]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(value_name = "SYNTAX_TREE", help = "Syntax tree of the module (JSON or YAML)")]
    pub syntax_tree: PathBuf,

    #[arg(
        short = 'a',
        long,
        value_name = "PATH",
        help = "Executable artifact the image is built around"
    )]
    pub artifact: PathBuf,

    #[arg(
        long,
        value_name = "PATH",
        help = "Override file (defaults to Cloud.toml next to the syntax tree)"
    )]
    pub cloud_toml: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "Output root directory [env: CLOUDPACK_OUTPUT_DIR]"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "MODE", help = "Build mode: k8s or docker [env: CLOUDPACK_CLOUD]")]
    pub cloud: Option<String>,

    #[arg(
        long,
        value_name = "IMAGE",
        help = "Base image when Cloud.toml sets none [env: CLOUDPACK_BASE_IMAGE]"
    )]
    pub base_image: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    #[arg(value_name = "SYNTAX_TREE", help = "Syntax tree of the module (JSON or YAML)")]
    pub syntax_tree: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
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
