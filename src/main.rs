use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ecoscan::{
    config::Config,
    options::Options,
    orchestrator::{monitor_all, run_tests},
    output::render_monitor_report,
    plugin::select_ecosystem,
    HttpDependencyApi,
};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const VULNS_FOUND: u8 = 1;
    pub const ERROR: u8 = 2;
    pub const NO_ECOSYSTEM: u8 = 3;
}

#[derive(Parser)]
#[command(name = "ecoscan")]
#[command(
    author,
    version,
    about = "Test and monitor native source trees and container images for vulnerable dependencies"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test dependencies for known vulnerabilities
    Test(ScanArgs),

    /// Snapshot dependencies for continuous monitoring
    Monitor(ScanArgs),

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Directories (with --source) or image references (with --container)
    #[arg(default_value = ".")]
    paths: Vec<String>,

    /// Scan unmanaged C/C++ source code
    #[arg(long)]
    source: bool,

    /// Scan container images
    #[arg(long, alias = "docker")]
    container: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Name of the monitored project
    #[arg(long)]
    project_name: Option<String>,
}

impl ScanArgs {
    fn options(&self, config: &Config) -> Options {
        Options {
            source: self.source,
            container: self.container,
            is_docker_user: config.docker_desktop,
            json: self.json,
            project_name: self.project_name.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("ecoscan=debug")
        } else {
            EnvFilter::new("ecoscan=warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Test(args) => {
            let config = Config::load()?;
            let options = args.options(&config);
            let Some(ecosystem) = select_ecosystem(&options) else {
                return Ok(no_ecosystem());
            };
            debug!("Testing with the {} ecosystem", ecosystem);

            let api = HttpDependencyApi::new(&config)?;
            let result = run_tests(ecosystem, &args.paths, &options, &api).await?;
            println!("{}", result.output());

            if result.vulnerable {
                Ok(exit_codes::VULNS_FOUND)
            } else {
                Ok(exit_codes::SUCCESS)
            }
        }
        Commands::Monitor(args) => {
            let config = Config::load()?;
            let options = args.options(&config);
            let Some(ecosystem) = select_ecosystem(&options) else {
                return Ok(no_ecosystem());
            };
            debug!("Monitoring with the {} ecosystem", ecosystem);

            let api = HttpDependencyApi::new(&config)?;
            let (results, errors) =
                monitor_all(ecosystem, &args.paths, &options, &config, &api).await?;
            let report = render_monitor_report(Vec::new(), &results, &errors, &options, &config)?;
            println!("{}", report.text());

            if report.is_failure() {
                Ok(exit_codes::ERROR)
            } else {
                Ok(exit_codes::SUCCESS)
            }
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn no_ecosystem() -> u8 {
    eprintln!("No supported ecosystem for these options. Use --source for C/C++ source trees or --container for container images.");
    exit_codes::NO_ECOSYSTEM
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    let config = Config::load()?;
    if config_path.exists() {
        println!("Config file: {}", config_path.display());
    } else {
        println!("No config file found, showing defaults.");
        println!("Run 'ecoscan config --init' to create one at: {}", config_path.display());
    }
    println!();
    println!("Effective configuration (environment overrides applied):");
    println!("{}", config.display_toml()?);

    Ok(())
}
