use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lumber_config::Settings;
use lumber_logging::{LoggerRegistry, Severity, DEFAULT_LOGGER};

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file layered over the built-in defaults
    /// (otherwise config/lumber.yaml and config/$LUMBER_ENV.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every configured logger and report how it was wired
    Check,
    /// Print a merged configuration entry
    Show(ShowArgs),
    /// Log one message through a named logger
    Emit(EmitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(value_enum)]
    pub section: SectionArg,
    pub name: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SectionArg {
    Formatters,
    Handlers,
    Loggers,
}

#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    #[arg(short, long, default_value = DEFAULT_LOGGER)]
    pub logger: String,
    #[arg(short = 'L', long, default_value = "info")]
    pub level: String,
    pub message: String,
}

pub fn run_command(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Check => check(settings, out),
        Commands::Show(args) => show(&settings, &args, out),
        Commands::Emit(args) => emit(settings, &args),
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::load_from_path(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Settings::load().context("loading configuration"),
    }
}

fn check(settings: Settings, out: &mut dyn Write) -> anyhow::Result<()> {
    let names: Vec<String> = settings.logging.loggers.names().map(str::to_string).collect();
    let registry = LoggerRegistry::new(settings.logging);

    for name in &names {
        let logger = registry
            .logger(name)
            .with_context(|| format!("building logger `{name}`"))?;
        let handlers: Vec<String> = logger
            .handlers()
            .iter()
            .map(|h| format!("{}({})", h.name(), h.kind()))
            .collect();
        writeln!(
            out,
            "{name}: level={} propagate={} handlers=[{}]",
            logger.level(),
            logger.propagate(),
            handlers.join(", ")
        )?;
    }
    tracing::info!(loggers = names.len(), "configuration checked");
    Ok(())
}

fn show(settings: &Settings, args: &ShowArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let (label, section) = match args.section {
        SectionArg::Formatters => ("formatters", &settings.logging.formatters),
        SectionArg::Handlers => ("handlers", &settings.logging.handlers),
        SectionArg::Loggers => ("loggers", &settings.logging.loggers),
    };
    let merged = section.merged(label, &args.name)?;
    out.write_all(serde_yaml::to_string(&merged)?.as_bytes())?;
    Ok(())
}

fn emit(settings: Settings, args: &EmitArgs) -> anyhow::Result<()> {
    let severity = Severity::resolve(&args.level)?;
    let registry = Arc::new(LoggerRegistry::new(settings.logging));
    registry.facade(&args.logger).log(severity, &args.message)?;
    Ok(())
}
