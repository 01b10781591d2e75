use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "railmap",
    version,
    about = "Static route table for Rails routing files",
    after_help = r#"Examples:
  railmap routes --repo .
  railmap routes --repo . --format json
  railmap routes --file config/routes.rb --format yaml
  railmap files --repo . --no-ignore
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// One `Controller#action` per line.
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the route table recognized from the repository's routes files.
    Routes {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Prepare only these files, in order, instead of discovering them.
        #[arg(long, value_name = "PATH")]
        file: Vec<PathBuf>,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List discovered routes files with their content hashes.
    Files {
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
    },
}
