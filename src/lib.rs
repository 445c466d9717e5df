// Core of the content generator client. The UI drives it through `commands`.

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod generation;
pub mod history;
pub mod models;
pub mod sanitize;
pub mod state;
pub mod title;

use clap::{Parser, Subcommand};
use commands::HistoryDetail;
use config::AppConfig;
use export::ExportFormat;
use form::FormAction;
use history::{CategoryFilter, ContentTypeFilter, HistoryFilter};
use models::{Category, Length, Tone};
use state::{AppState, GenerationState, Session};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kontengen", about = "AI content generator client")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = "KONTEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new document
    Generate {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = "")]
        keywords: String,
        #[arg(long)]
        tone: Option<String>,
        /// "AI Education" or "AI Sales"
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
        /// short, medium, long or extended
        #[arg(long)]
        length: Option<String>,
        /// Also export the result (txt, pdf or pptx)
        #[arg(long)]
        export: Option<String>,
    },
    /// List past documents
    History {
        /// all, education or sales
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Show one past document
    Show { id: String },
    /// Totals and recent activity
    Dashboard,
    /// Export a past document (txt, pdf or pptx)
    Export {
        id: String,
        #[arg(long, default_value = "txt")]
        format: String,
    },
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(value).ok_or_else(|| format!("Unknown export format: {}", value))
}

// Parses an optional option value, rejecting anything the form does not offer
fn parse_option<T>(value: Option<&str>, parse: fn(&str) -> Option<T>, what: &str) -> Result<Option<T>, String> {
    value
        .map(|raw| parse(raw).ok_or_else(|| format!("Unknown {}: {}", what, raw)))
        .transpose()
}

fn build_session(
    topic: String,
    keywords: String,
    tone: Option<String>,
    category: Option<String>,
    content_type: Option<String>,
    length: Option<String>,
) -> Result<Session, String> {
    let tone = parse_option(tone.as_deref(), Tone::parse, "tone")?;
    let category = parse_option(category.as_deref(), Category::parse, "category")?;
    let length = parse_option(length.as_deref(), Length::parse, "length")?;

    let content_type = content_type.unwrap_or_default();
    if !content_type.is_empty() && !category.is_some_and(|c| c.allows(&content_type)) {
        return Err(format!("Content type '{}' is not offered for the chosen category", content_type));
    }

    let mut session = Session::new();
    let actions = [
        FormAction::SetTopic(topic),
        FormAction::SetKeywords(keywords),
        FormAction::SetTone(tone),
        FormAction::SetCategory(category),
        FormAction::SetContentType(content_type),
        FormAction::SetLength(length),
    ];
    for action in actions {
        session.update_form(action);
    }
    Ok(session)
}

async fn dispatch(state: &AppState, command: Command) -> Result<(), String> {
    match command {
        Command::Generate {
            topic,
            keywords,
            tone,
            category,
            content_type,
            length,
            export,
        } => {
            let format = export.as_deref().map(parse_format).transpose()?;
            let mut session = build_session(topic, keywords, tone, category, content_type, length)?;
            if let Some(length) = session.form.length {
                println!("Panjang: {}\n", length.label());
            }
            let report = commands::generate_content(state, &mut session).await?;
            if let Some(text) = report.state.display_text() {
                println!("{}", text);
            }
            if let (Some(format), GenerationState::Succeeded(_)) = (format, &report.state) {
                let path = commands::export_session(state, &session, format).await?;
                println!("\nSaved to {}", path.display());
            }
            // Let the archive call finish before the process exits
            if let Some(task) = report.archive_task {
                let _ = task.await;
            }
        }
        Command::History { category, content_type } => {
            let category = CategoryFilter::parse(&category)
                .ok_or_else(|| format!("Unknown category filter: {}", category))?;
            let content_type = content_type.map_or(ContentTypeFilter::All, ContentTypeFilter::Exact);
            let filter = HistoryFilter::default()
                .with_category(category)
                .with_content_type(content_type);
            let items = commands::list_history(state, &filter).await;
            if items.is_empty() {
                println!("{}", history::NO_CONTENT_YET);
            }
            for item in items {
                let when = item
                    .created_at
                    .map(|ts| ts.with_timezone(&chrono::Local).format("%d/%m/%Y %H:%M").to_string())
                    .unwrap_or_default();
                println!("[{}] {} ({})\n    {}", item.id.unwrap_or_default(), item.title, when, item.preview);
            }
        }
        Command::Show { id } => match commands::get_history_item(state, &id).await {
            HistoryDetail::Found(doc) => println!("{}\n\n{}", doc.topic, doc.content),
            HistoryDetail::NotFound => println!("Konten tidak ditemukan."),
        },
        Command::Dashboard => {
            let view = commands::load_dashboard(state).await;
            println!("Total Konten: {}", view.stats.total);
            println!("Hari Ini: {}", view.stats.today);
            println!("Jenis Konten: {}", view.stats.distinct_content_types);
            match view.empty_message {
                Some(message) => println!("\n{}", message),
                None => {
                    println!("\nAktivitas Terbaru:");
                    for item in view.recent {
                        println!("- {} [{}]", item.title, item.content_type);
                    }
                }
            }
        }
        Command::Export { id, format } => {
            let format = parse_format(&format)?;
            let path = commands::export_history_item(state, &id, format).await?;
            println!("Saved to {}", path.display());
        }
    }
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    // clap already falls back to KONTEN_CONFIG for the file path
    let config = AppConfig::load(cli.config.as_deref())?;
    log::debug!("Loaded config: {:?}", config);

    let app_state = AppState::from_config(&config);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime
        .block_on(dispatch(&app_state, cli.command))
        .map_err(|e| anyhow::anyhow!(e))
}
