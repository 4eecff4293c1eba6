use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};

mod dashboard;
mod error;
mod export;
mod ingest;
mod logging;
mod models;
mod normalize;
mod productivity;
mod report;
mod schema;
mod session;
mod status;

use dashboard::Dashboard;
use session::Session;
use status::AssigneeFilter;

#[derive(Parser)]
#[command(name = "ticket-productivity")]
#[command(about = "Service-desk productivity dashboard for ticket spreadsheets", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the columns an uploaded sheet must contain
    Columns,
    /// Per-assignee productivity metrics
    Summary {
        /// Spreadsheet to load (`-` reads an xlsx from stdin)
        #[arg(long)]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List the assignee filter options
    Assignees {
        #[arg(long)]
        file: PathBuf,
    },
    /// Ticket count per status, optionally for one assignee
    Chart {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Full dashboard plus an xlsx export
    Report {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
}

fn open_dashboard(file: &std::path::Path) -> anyhow::Result<Dashboard> {
    let username = std::env::var("DASHBOARD_USER")
        .context("DASHBOARD_USER must be set to open a dashboard session")?;
    let password = std::env::var("DASHBOARD_PASSWORD")
        .context("DASHBOARD_PASSWORD must be set to open a dashboard session")?;

    let mut dashboard = Dashboard::new(Session::new());
    if !dashboard.login(&username, &password) {
        anyhow::bail!("Usuário ou senha incorretos!");
    }
    let uploaded = if file.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read spreadsheet from stdin")?;
        dashboard.upload_bytes("stdin", &bytes).map(|_| ())
    } else {
        dashboard.upload_path(file).map(|_| ())
    };

    if let Err(err) = uploaded {
        if let Some(missing) = err.missing_columns() {
            eprintln!("Colunas necessárias ausentes ({}):", missing.len());
            for column in missing {
                eprintln!("- {column}");
            }
        }
        return Err(err.into());
    }
    Ok(dashboard)
}

/// Runs one command inside a session and logs out once it finishes.
fn with_dashboard<T>(
    file: &std::path::Path,
    run: impl FnOnce(&Dashboard) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut dashboard = open_dashboard(file)?;
    let result = run(&dashboard);
    dashboard.logout();
    result
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Columns => {
            println!("Colunas necessárias:");
            for column in schema::REQUIRED_COLUMNS {
                println!("- {column}");
            }
        }
        Commands::Summary { file, format } => with_dashboard(&file, |dashboard| {
            let summary = dashboard.summary()?;
            let overview = dashboard.overview()?;

            match format {
                Format::Json => {
                    let body = serde_json::json!({ "summary": summary, "overview": overview });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Format::Text => {
                    print!("{}", report::render_summary_table(summary));
                    println!();
                    print!("{}", report::render_overview(&overview));
                }
            }
            Ok(())
        })?,
        Commands::Assignees { file } => with_dashboard(&file, |dashboard| {
            for option in dashboard.assignee_options()? {
                println!("{option}");
            }
            Ok(())
        })?,
        Commands::Chart {
            file,
            assignee,
            format,
        } => with_dashboard(&file, |dashboard| {
            let filter = AssigneeFilter::parse(assignee.as_deref());

            match format {
                Format::Json => {
                    let chart = dashboard.status_chart(&filter)?;
                    println!("{}", serde_json::to_string_pretty(&chart)?);
                }
                Format::Text => {
                    let distribution = dashboard.status_distribution(&filter)?;
                    print!("{}", report::render_status_chart(&distribution));
                }
            }
            Ok(())
        })?,
        Commands::Report {
            file,
            assignee,
            out_dir,
            markdown,
        } => with_dashboard(&file, |dashboard| {
            let filter = AssigneeFilter::parse(assignee.as_deref());

            let upload = dashboard.current()?;
            let overview = dashboard.overview()?;
            let distribution = dashboard.status_distribution(&filter)?;
            let rendered =
                report::build_report(&upload.source, &upload.summary, &overview, &distribution);

            match markdown {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }

            let export = dashboard.export(&filter, Local::now().naive_local())?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            let target = out_dir.join(&export.file_name);
            tracing::debug!(mime = export.mime_type(), "writing export");
            std::fs::write(&target, &export.bytes)
                .with_context(|| format!("failed to write {}", target.display()))?;
            println!("Spreadsheet written to {}.", target.display());
            Ok(())
        })?,
    }

    Ok(())
}
