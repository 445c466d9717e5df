use crate::api::{GenerationService, HistoryBackend, HttpGenerationService, HttpHistoryBackend};
use crate::config::AppConfig;
use crate::form::FormAction;
use crate::generation::GenerationClient;
use crate::history::HistoryRepository;
use crate::models::{Document, FormInput};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// Collaborators shared by every command. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub generator: GenerationClient,
    pub history: HistoryRepository,
    pub history_backend: Arc<dyn HistoryBackend>,
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        generation_service: Arc<dyn GenerationService>,
        history_backend: Arc<dyn HistoryBackend>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            generator: GenerationClient::new(generation_service),
            history: HistoryRepository::new(history_backend.clone()),
            history_backend,
            export_dir,
        }
    }

    // Wires the HTTP collaborators from config
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(HttpGenerationService::new(config.generation_url.clone())),
            Arc::new(HttpHistoryBackend::new(config.history_url.clone())),
            config.export_dir.clone(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum GenerationState {
    #[default]
    Idle,
    InFlight,
    Succeeded(Document),
    FailedSoft(String),
}

impl GenerationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, GenerationState::InFlight)
    }

    // Text shown in the result pane, if any
    pub fn display_text(&self) -> Option<&str> {
        match self {
            GenerationState::Succeeded(doc) => Some(&doc.content),
            GenerationState::FailedSoft(text) => Some(text),
            GenerationState::Idle | GenerationState::InFlight => None,
        }
    }
}

/// Everything one UI session owns: the form, the generation state and the
/// locally edited result. Only one caller holds it at a time.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: Uuid,
    pub form: FormInput,
    pub generation: GenerationState,
    // Local edits to the displayed result; never written back to history
    pub edited_content: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            form: FormInput::default(),
            generation: GenerationState::Idle,
            edited_content: None,
        }
    }

    pub fn update_form(&mut self, action: FormAction) {
        let form = std::mem::take(&mut self.form);
        self.form = form.apply(action);
    }

    /// The generate control is enabled only with a topic and nothing in flight.
    pub fn can_submit(&self) -> bool {
        self.form.has_topic() && !self.generation.is_in_flight()
    }

    pub fn edit_content(&mut self, content: String) {
        self.edited_content = Some(content);
    }

    /// Topic and content an export of the current result should use.
    pub fn export_source(&self) -> (String, String) {
        let content = self
            .edited_content
            .clone()
            .or_else(|| self.generation.display_text().map(str::to_string))
            .unwrap_or_default();
        (self.form.topic.clone(), content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn submit_needs_topic_and_idle_generation() {
        let mut session = Session::new();
        assert!(!session.can_submit());

        session.update_form(FormAction::SetTopic("Fotosintesis".into()));
        assert!(session.can_submit());

        session.generation = GenerationState::InFlight;
        assert!(!session.can_submit());

        session.generation = GenerationState::FailedSoft("x".into());
        assert!(session.can_submit());
    }

    #[test]
    fn update_form_goes_through_reducer() {
        let mut session = Session::new();
        session.update_form(FormAction::SetCategory(Some(Category::Sales)));
        session.update_form(FormAction::SetContentType("Iklan Produk".into()));
        session.update_form(FormAction::SetCategory(Some(Category::Education)));
        assert_eq!(session.form.content_type, "");
    }

    #[test]
    fn local_edits_win_for_export() {
        let mut session = Session::new();
        session.update_form(FormAction::SetTopic("Topik".into()));
        session.generation = GenerationState::FailedSoft("fallback".into());
        assert_eq!(session.export_source().1, "fallback");

        session.edit_content("diubah".into());
        assert_eq!(session.export_source(), ("Topik".to_string(), "diubah".to_string()));
    }

    #[test]
    fn nothing_to_export_before_generation() {
        assert_eq!(Session::new().export_source().1, "");
    }
}
