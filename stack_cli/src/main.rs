use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use website_stack::variables::load_dot_env;
use website_stack::{Dashboard, StackConfig, Variables, WebsiteStack, WorkspacePackages};

mod logging;

pub const DASHBOARD_ID: &str = "Dashboard";

#[derive(Parser)]
#[command(name = "sitestack", version, about = "Renders the cloudformation template of a website stack")]
struct Cli {
    /// -v info, -vv debug, -vvv trace. RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// write the template for the stack described by a config file
    Synth(SynthArgs),
}

#[derive(Args)]
struct SynthArgs {
    /// stack config file
    #[arg(short, long, default_value = "website.toml")]
    config: PathBuf,

    /// where to write the template. stdout if not given
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// extra KEY=VALUE file consulted after the process environment
    #[arg(long)]
    dotenv: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("{e:#}");
    }
    let res = match cli.command {
        Commands::Synth(args) => run_synth(&args),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_synth(args: &SynthArgs) -> anyhow::Result<()> {
    let template = synth(args)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, template).with_context(|| format!("Failed to write template to {path:?}"))?;
            info!(path = ?path, "wrote template");
        }
        None => println!("{template}"),
    }
    Ok(())
}

fn synth(args: &SynthArgs) -> anyhow::Result<String> {
    let config = StackConfig::load(&args.config)
        .with_context(|| format!("Failed to load stack config {:?}", args.config))?;
    let config_dir = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut vars = Variables::from_process_env();
    if let Some(dotenv) = &args.dotenv {
        vars = vars.with_source(load_dot_env(dotenv)?);
    }

    let root = config.workspace_root(config_dir);
    let workspace = WorkspacePackages::discover(&root)
        .with_context(|| format!("Failed to read workspace at {root:?}"))?;
    info!(packages = workspace.len(), root = ?root, "loaded workspace");

    let props = config.to_props(&vars);
    let mut dashboard = config.dashboard_name.clone().map(Dashboard::new);
    let mut site = WebsiteStack::build(&config.stack_name, &props, &workspace, dashboard.as_mut())?;
    if let Some(dashboard) = dashboard {
        site.stack_mut().add_resource(DASHBOARD_ID, dashboard);
    }
    Ok(site.stack().to_json_pretty()?)
}
