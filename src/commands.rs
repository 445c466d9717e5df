// Operations the UI calls into. Each one logs, then maps internal errors to
// user-facing strings.

use crate::api::HistoryBackend;
use crate::export::{self, ExportArtifact, ExportFormat};
use crate::form;
use crate::generation::GenerationOutcome;
use crate::history::{self, DashboardStats, HistoryFilter, HistoryListItem, NO_CONTENT_YET, RECENT_LIMIT};
use crate::models::{ArchiveEntry, Document};
use crate::state::{AppState, GenerationState, Session};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const GENERATION_BUSY: &str = "Konten sedang dibuat, tunggu sebentar.";

#[derive(Debug)]
pub struct GenerationReport {
    pub state: GenerationState,
    // Detached archive call; dropping the handle does not cancel it
    pub archive_task: Option<JoinHandle<()>>,
}

// Generate content from the session's form and archive it in the background
pub async fn generate_content(state: &AppState, session: &mut Session) -> Result<GenerationReport, String> {
    log::info!("[CMD] Session {} requested generation", session.id);

    if session.generation.is_in_flight() {
        log::warn!("[CMD] Generation already in flight for session {}", session.id);
        return Err(GENERATION_BUSY.to_string());
    }

    let request = match form::build(&session.form) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("[CMD] Generation refused: {}", e);
            return Err(e.to_string());
        }
    };

    session.edited_content = None;
    let guard = InFlightGuard::begin(&mut session.generation);

    let outcome = state.generator.generate(&request).await;

    let archive_task = match &outcome {
        GenerationOutcome::Generated(doc) => Some(spawn_archive(
            state.history_backend.clone(),
            ArchiveEntry::new(&request, doc),
        )),
        GenerationOutcome::Fallback(_) => None,
    };

    guard.settle(match outcome {
        GenerationOutcome::Generated(doc) => GenerationState::Succeeded(doc),
        GenerationOutcome::Fallback(text) => GenerationState::FailedSoft(text),
    });

    Ok(GenerationReport {
        state: session.generation.clone(),
        archive_task,
    })
}

// Marks a generation as in flight. If the future driving it is dropped before
// an outcome is stored, the session goes back to Idle so it can submit again.
struct InFlightGuard<'a> {
    generation: &'a mut GenerationState,
}

impl<'a> InFlightGuard<'a> {
    fn begin(generation: &'a mut GenerationState) -> Self {
        *generation = GenerationState::InFlight;
        Self { generation }
    }

    fn settle(self, outcome: GenerationState) {
        *self.generation = outcome;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.generation.is_in_flight() {
            log::warn!("[CMD] Generation abandoned before it finished; session is idle again");
            *self.generation = GenerationState::Idle;
        }
    }
}

// Fire-and-forget: a failed archive is logged and nothing else
fn spawn_archive(backend: Arc<dyn HistoryBackend>, entry: ArchiveEntry) -> JoinHandle<()> {
    tokio::spawn(async move {
        match backend.archive(&entry).await {
            Ok(()) => log::info!("Archived '{}' to history", entry.topic),
            Err(e) => log::warn!(
                "Failed to archive '{}'; generated content is unaffected: {:?}",
                entry.topic,
                e
            ),
        }
    })
}

// List past documents, newest first, narrowed by the filter
pub async fn list_history(state: &AppState, filter: &HistoryFilter) -> Vec<HistoryListItem> {
    log::info!("[CMD] History list requested with filter {:?}", filter);
    let docs = state.history.fetch_all().await;
    history::filter(&docs, filter)
        .iter()
        .map(HistoryListItem::from_document)
        .collect()
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", content = "document", rename_all = "snake_case")]
pub enum HistoryDetail {
    Found(Document),
    NotFound,
}

pub async fn get_history_item(state: &AppState, id: &str) -> HistoryDetail {
    log::info!("[CMD] History item {} requested", id);
    let docs = state.history.fetch_all().await;
    match history::find_by_id(&docs, id) {
        Some(doc) => HistoryDetail::Found(doc.clone()),
        None => {
            log::info!("[CMD] History item {} not found", id);
            HistoryDetail::NotFound
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RecentActivity {
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub content_type: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub recent: Vec<RecentActivity>,
    // Set when there is nothing to list
    pub empty_message: Option<&'static str>,
}

pub async fn load_dashboard(state: &AppState) -> DashboardView {
    log::info!("[CMD] Dashboard requested");
    let docs = state.history.fetch_all().await;
    let stats = DashboardStats::compute(&docs, Local::now().date_naive());

    let recent: Vec<RecentActivity> = docs
        .iter()
        .take(RECENT_LIMIT)
        .map(|doc| RecentActivity {
            title: history::display_topic(&doc.topic).to_string(),
            created_at: doc.created_at,
            content_type: if doc.content_type.is_empty() {
                "Konten".to_string()
            } else {
                doc.content_type.clone()
            },
        })
        .collect();

    let empty_message = if recent.is_empty() { Some(NO_CONTENT_YET) } else { None };
    DashboardView {
        stats,
        recent,
        empty_message,
    }
}

async fn build_artifact(format: ExportFormat, topic: &str, content: &str) -> Result<ExportArtifact, String> {
    let result = match format {
        // Packing the deck is the heavy part, keep it off the async threads
        ExportFormat::Slides => {
            let (topic, content) = (topic.to_string(), content.to_string());
            tokio::task::spawn_blocking(move || export::export(format, &topic, &content))
                .await
                .map_err(|e| format!("Export task failed: {}", e))?
        }
        _ => export::export(format, topic, content),
    };
    result.map_err(|e| {
        log::warn!("[CMD] Export refused: {}", e);
        e.to_string()
    })
}

// Export a (topic, content) pair into the configured export directory
pub async fn export_document(
    state: &AppState,
    format: ExportFormat,
    topic: &str,
    content: &str,
) -> Result<PathBuf, String> {
    log::info!("[CMD] Export as {:?} requested for '{}'", format, topic);
    let artifact = build_artifact(format, topic, content).await?;
    export::write_artifact(&state.export_dir, &artifact)
        .await
        .map_err(|e| {
            log::error!("[CMD] Failed to write export: {:?}", e);
            e.to_string()
        })
}

// Export whatever the session's result pane currently shows
pub async fn export_session(state: &AppState, session: &Session, format: ExportFormat) -> Result<PathBuf, String> {
    let (topic, content) = session.export_source();
    export_document(state, format, &topic, &content).await
}

pub async fn export_history_item(state: &AppState, id: &str, format: ExportFormat) -> Result<PathBuf, String> {
    match get_history_item(state, id).await {
        HistoryDetail::Found(doc) => export_document(state, format, &doc.topic, &doc.content).await,
        HistoryDetail::NotFound => Err(format!("Konten dengan id {} tidak ditemukan", id)),
    }
}
