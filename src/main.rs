// Calendar Image Application
// Main entry point

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand};

use calendar_image::models::grid::MonthGrid;
use calendar_image::models::settings::{AppConfig, FontFiles};
use calendar_image::services::delivery::write_output;
use calendar_image::services::layout::build_month_grid;
use calendar_image::services::poller::{ChangePoller, PollDecision};
use calendar_image::services::render::{render_month, FontSet, OutputFormat};
use calendar_image::services::settings::{EnvOverrides, SettingsService};
use calendar_image::services::source::{open_source, EventSource};

#[derive(Parser)]
#[command(name = "calendar-image")]
#[command(about = "Render a month of calendar events as a PNG or PDF image")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one month and write it to the output directory
    Render(RenderArgs),
    /// Poll the event source and re-render whenever it changes
    Watch {
        #[command(flatten)]
        render: RenderArgs,

        /// Minutes between checks (overrides the config file)
        #[arg(long)]
        interval_minutes: Option<u64>,
    },
    /// Print the month grid as text
    Grid(MonthArgs),
}

#[derive(Args, Clone, Copy)]
struct MonthArgs {
    /// Year to render (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,

    /// Month to render, 1-12 (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
}

impl MonthArgs {
    fn resolve(&self) -> (i32, u32) {
        let today = Local::now().date_naive();
        (
            self.year.unwrap_or_else(|| today.year()),
            self.month.unwrap_or_else(|| today.month()),
        )
    }
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    month: MonthArgs,

    /// Output format: png or pdf
    #[arg(long, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Output directory (defaults to output_dir from the config, then ".")
    #[arg(long)]
    out: Option<PathBuf>,

    /// Config file (defaults to the per-user config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Event source: a JSON file, an .ics file or an https:// ICS URL
    #[arg(long)]
    events: Option<String>,

    /// Font file for all text (overrides [font_files] in the config)
    #[arg(long)]
    font: Option<PathBuf>,
}

/// Everything one render needs, resolved from arguments and config
struct RenderJob {
    config: AppConfig,
    month: MonthArgs,
    format: OutputFormat,
    out_dir: PathBuf,
    fonts: FontSet,
}

impl RenderJob {
    fn run(&self, source: &dyn EventSource, year: i32, month: u32) -> Result<PathBuf> {
        let events = source
            .events_for_month(year, month)
            .with_context(|| format!("Failed to load events for {}-{:02}", year, month))?;

        let backend = self.format.backend_with_fonts(self.fonts.clone());
        let measure = self.fonts.measure();
        let bytes = render_month(
            year,
            month,
            &events,
            &self.config.layout,
            &self.config.theme,
            measure.as_ref(),
            backend.as_ref(),
        )?;

        write_output(&self.out_dir, year, month, backend.file_extension(), &bytes)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            let (job, location) = prepare(&args)?;
            let source = open_source(&location)?;
            let (year, month) = job.month.resolve();
            let path = job.run(source.as_ref(), year, month)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Watch {
            render,
            interval_minutes,
        } => {
            let (mut job, location) = prepare(&render)?;
            if let Some(minutes) = interval_minutes {
                anyhow::ensure!(minutes > 0, "--interval-minutes must be at least 1");
                job.config.poller.interval_minutes = minutes;
            }
            run_watch(job, &location)
        }
        Commands::Grid(month) => {
            let (year, month) = month.resolve();
            let grid = build_month_grid(year, month)?;
            print!("{}", format_grid(&grid));
            Ok(())
        }
    }
}

/// Load config and resolve where events come from and where files go.
fn prepare(args: &RenderArgs) -> Result<(RenderJob, String)> {
    let settings = match &args.config {
        Some(path) => SettingsService::new(path),
        None => SettingsService::from_default_location()?,
    };
    let mut config = settings.load_with_overrides(&EnvOverrides::from_env())?;
    if let Some(font) = &args.font {
        config.font_files = FontFiles::single(font);
    }
    let fonts = FontSet::load(&config.font_files);

    let location = args
        .events
        .clone()
        .or_else(|| config.source.as_ref().map(|source| source.location.clone()))
        .context("No event source: pass --events or set [source] location in the config")?;

    let out_dir = args
        .out
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    Ok((
        RenderJob {
            config,
            month: args.month,
            format: args.format,
            out_dir,
            fonts,
        },
        location,
    ))
}

fn run_watch(job: RenderJob, location: &str) -> Result<()> {
    // The source owns a blocking HTTP client, which must be created and
    // dropped outside the async runtime.
    let source: Arc<dyn EventSource + Send + Sync> = Arc::from(open_source(location)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(watch_loop(Arc::new(job), Arc::clone(&source)));
    drop(runtime);
    result
}

async fn watch_loop(job: Arc<RenderJob>, source: Arc<dyn EventSource + Send + Sync>) -> Result<()> {
    let base_delay = Duration::from_secs(job.config.poller.interval_minutes.saturating_mul(60));
    let mut poller = ChangePoller::new();
    let mut last_month: Option<(i32, u32)> = None;

    log::info!(
        "Watching for changes every {} minutes",
        job.config.poller.interval_minutes
    );

    loop {
        let (year, month) = job.month.resolve();
        if last_month.is_some_and(|last| last != (year, month)) {
            log::info!("Month changed to {}-{:02}, forcing a render", year, month);
            poller.invalidate();
        }
        last_month = Some((year, month));

        let tick_job = Arc::clone(&job);
        let tick_source = Arc::clone(&source);
        let joined = tokio::task::spawn_blocking(move || {
            let outcome = watch_tick(&mut poller, tick_job.as_ref(), tick_source.as_ref(), year, month);
            (poller, outcome)
        })
        .await;

        poller = match joined {
            Ok((returned, outcome)) => {
                match outcome {
                    Ok(Some(path)) => log::info!("Rendered {}", path.display()),
                    Ok(None) => {}
                    Err(err) => log::error!("Watch cycle failed: {:#}", err),
                }
                returned
            }
            Err(err) => {
                log::error!("Watch task panicked: {}", err);
                ChangePoller::new()
            }
        };

        let delay = poller.next_delay(base_delay);
        log::debug!("Next check in {:?}", delay);

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}

fn watch_tick(
    poller: &mut ChangePoller,
    job: &RenderJob,
    source: &dyn EventSource,
    year: i32,
    month: u32,
) -> Result<Option<PathBuf>> {
    match poller.poll(source).context("Failed to check event source")? {
        PollDecision::Unchanged => {
            log::info!("Events unchanged, skipping render");
            Ok(None)
        }
        PollDecision::Render => {
            log::info!("Events changed, rendering {}-{:02}", year, month);
            job.run(source, year, month).map(Some).inspect_err(|_| {
                // Retry on the next tick even if the tag stays the same
                poller.invalidate();
            })
        }
    }
}

/// Text rendering of the grid; days outside the month are bracketed.
fn format_grid(grid: &MonthGrid) -> String {
    let mut out = format!("{}-{:02}\n", grid.year, grid.month);
    out.push_str("  Sun  Mon  Tue  Wed  Thu  Fri  Sat\n");

    for week in &grid.weeks {
        for date in week.days {
            let cell = if grid.is_in_month(date) {
                format!("{:>5}", date.day())
            } else {
                format!("{:>5}", format!("({})", date.day()))
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }

    out
}
