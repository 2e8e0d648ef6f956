use anyhow::{Context, Result, bail};
use buildmeta_core::TOOL_NAME;
use buildmeta_core::output::render;
use buildmeta_core::output::summary::{Summary, ToolInfo};
use buildmeta_core::scm::git::GitCli;
use buildmeta_core::sections::{Classifier, SectionCatalog};
use buildmeta_core::{BuildPoint, record_build_point, run};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod args;
mod context;

use args::{Args, CollectArgs, Command, SummaryFormat};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match &args.command {
        Some(Command::Collect(flags)) => collect(&args, flags),
        Some(Command::Point {
            name,
            properties_out,
        }) => point(&args, name.clone(), properties_out.clone()),
        None => collect(&args, &args.collect),
    }
}

fn collect(args: &Args, flags: &CollectArgs) -> Result<()> {
    let base_dir = context::base_dir(args)?;
    let mut config = context::load_config(&args.config, &base_dir)?;
    context::apply_overrides(&mut config, flags);
    let ctx = context::build_context(config, base_dir, flags);

    let git = GitCli::default();
    let outcome = run(&ctx, &git).map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{stage} stage failed"))
    })?;

    for path in &outcome.written {
        info!(path = %path.display(), "written");
    }

    if let Some(format) = flags.summary {
        if !outcome.skipped {
            let catalog = SectionCatalog::standard();
            let classifier = Classifier::new(&catalog, &ctx.config.properties);
            let tool = ToolInfo {
                name: TOOL_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            };
            let summary = Summary::new(tool, &outcome.store, &classifier);
            let output = match format {
                SummaryFormat::Json => render::render_json(&summary)?,
                SummaryFormat::Text => render::render_text(&summary),
            };
            print!("{output}");
        }
    }

    if !outcome.is_success() {
        for err in &outcome.errors {
            error!(stage = err.stage(), "{err}");
        }
        bail!("{} output(s) could not be written", outcome.errors.len());
    }
    Ok(())
}

fn point(
    args: &Args,
    name: Option<String>,
    properties_out: Option<std::path::PathBuf>,
) -> Result<()> {
    let base_dir = context::base_dir(args)?;
    let mut config = context::load_config(&args.config, &base_dir)?;
    if let Some(path) = properties_out {
        config.output.properties_file = path;
    }
    let path = if config.output.properties_file.is_absolute() {
        config.output.properties_file.clone()
    } else {
        base_dir.join(&config.output.properties_file)
    };

    let point = BuildPoint::new(name, Utc::now());
    record_build_point(&path, &base_dir, &point)
        .with_context(|| format!("failed to record build point in {}", path.display()))?;
    Ok(())
}
