use anyhow::Result;
use clap::Parser;
use railmap::cli::{self, OutputFormat};
use railmap::config::Config;
use railmap::prepare::{Runner, scan::ScanOptions};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_new(&Config::get().log_filter)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_tracing();

    match args.command {
        cli::Command::Routes {
            repo,
            file,
            no_ignore,
            format,
        } => {
            let mut runner = Runner::new(repo, ScanOptions::new(no_ignore))?;
            let stats = if file.is_empty() {
                runner.run()?
            } else {
                runner.run_paths(&file)?
            };
            match format {
                OutputFormat::Text => {
                    for route in runner.registry() {
                        println!("{route}");
                    }
                }
                OutputFormat::Json => {
                    let table = runner.route_table(stats);
                    println!("{}", serde_json::to_string_pretty(&table)?);
                }
                OutputFormat::Yaml => {
                    let table = runner.route_table(stats);
                    print!("{}", serde_yaml_ng::to_string(&table)?);
                }
            }
            Ok(())
        }
        cli::Command::Files { repo, no_ignore } => {
            let runner = Runner::new(repo, ScanOptions::new(no_ignore))?;
            let files = runner.files()?;
            println!("{}", serde_json::to_string_pretty(&files)?);
            Ok(())
        }
    }
}
