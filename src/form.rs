use crate::error::ValidationError;
use crate::models::{Category, FormInput, GenerationRequest, Length, Tone, MAX_TOKENS};

// Edits the UI can make to the creation form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormAction {
    SetTopic(String),
    SetKeywords(String),
    SetTone(Option<Tone>),
    SetCategory(Option<Category>),
    SetContentType(String),
    SetLength(Option<Length>),
    Reset,
}

impl FormInput {
    /// Applies one edit and returns the new form.
    ///
    /// Picking a category always clears the content type, and a content type
    /// outside the current category's set is ignored.
    pub fn apply(self, action: FormAction) -> FormInput {
        match action {
            FormAction::SetTopic(topic) => FormInput { topic, ..self },
            FormAction::SetKeywords(keywords) => FormInput { keywords, ..self },
            FormAction::SetTone(tone) => FormInput { tone, ..self },
            FormAction::SetCategory(category) => FormInput {
                category,
                content_type: String::new(),
                ..self
            },
            FormAction::SetContentType(content_type) => {
                let allowed = content_type.is_empty()
                    || self.category.map_or(false, |c| c.allows(&content_type));
                if allowed {
                    FormInput { content_type, ..self }
                } else {
                    log::debug!(
                        "Ignoring content type '{}' for category {:?}",
                        content_type,
                        self.category
                    );
                    self
                }
            }
            FormAction::SetLength(length) => FormInput { length, ..self },
            FormAction::Reset => FormInput::default(),
        }
    }

    pub fn has_topic(&self) -> bool {
        !self.topic.trim().is_empty()
    }
}

/// Renders the prompt sent to the model. Field order is fixed.
pub fn render_prompt(
    category: &str,
    content_type: &str,
    topic: &str,
    keywords: &str,
    tone: &str,
    length: &str,
) -> String {
    format!(
        "Kategori: {}.\nJenis konten: {}.\nTopik: {}.\nKata kunci: {}.\nTone: {}.\nPanjang: {}.",
        category, content_type, topic, keywords, tone, length
    )
}

/// Builds the generation payload from the form. Only the topic is required;
/// everything else is passed through as-is, unselected options as "".
pub fn build(form: &FormInput) -> Result<GenerationRequest, ValidationError> {
    if !form.has_topic() {
        return Err(ValidationError::MissingTopic);
    }

    let category = form.category.map(|c| c.as_str()).unwrap_or_default();
    let tone = form.tone.map(|t| t.as_str()).unwrap_or_default();
    let length = form.length.map(|l| l.as_str()).unwrap_or_default();

    let prompt = render_prompt(
        category,
        &form.content_type,
        &form.topic,
        &form.keywords,
        tone,
        length,
    );

    Ok(GenerationRequest {
        prompt,
        topic: form.topic.clone(),
        keywords: form.keywords.clone(),
        tone: tone.to_string(),
        category: category.to_string(),
        content_type: form.content_type.clone(),
        length: length.to_string(),
        max_tokens: MAX_TOKENS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fotosintesis_form() -> FormInput {
        FormInput::default()
            .apply(FormAction::SetTopic("Fotosintesis".into()))
            .apply(FormAction::SetCategory(Some(Category::Education)))
            .apply(FormAction::SetContentType("Materi Pembelajaran".into()))
            .apply(FormAction::SetTone(Some(Tone::Formal)))
            .apply(FormAction::SetLength(Some(Length::Medium)))
            .apply(FormAction::SetKeywords("tumbuhan,cahaya".into()))
    }

    #[test]
    fn empty_topic_is_refused() {
        assert_eq!(build(&FormInput::default()), Err(ValidationError::MissingTopic));
        let blank = FormInput::default().apply(FormAction::SetTopic("   ".into()));
        assert_eq!(build(&blank), Err(ValidationError::MissingTopic));
    }

    #[test]
    fn prompt_lists_fields_in_template_order() {
        let request = build(&fotosintesis_form()).unwrap();
        let p = &request.prompt;
        let order = [
            p.find("AI Education").unwrap(),
            p.find("Materi Pembelajaran").unwrap(),
            p.find("Fotosintesis").unwrap(),
            p.find("tumbuhan,cahaya").unwrap(),
            p.find("formal").unwrap(),
            p.find("medium").unwrap(),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "{}", p);
    }

    #[test]
    fn payload_mirrors_form_fields() {
        let request = build(&fotosintesis_form()).unwrap();
        assert_eq!(request.topic, "Fotosintesis");
        assert_eq!(request.category, "AI Education");
        assert_eq!(request.content_type, "Materi Pembelajaran");
        assert_eq!(request.tone, "formal");
        assert_eq!(request.length, "medium");
        assert_eq!(request.keywords, "tumbuhan,cahaya");
        assert_eq!(request.max_tokens, 3000);
    }

    #[test]
    fn optional_fields_may_be_empty() {
        let form = FormInput::default().apply(FormAction::SetTopic("Diskon Akhir Tahun".into()));
        let request = build(&form).unwrap();
        assert_eq!(request.category, "");
        assert_eq!(request.tone, "");
        assert!(request.prompt.contains("Topik: Diskon Akhir Tahun."));
        assert!(request.prompt.contains("Kategori: ."));
    }

    #[test]
    fn changing_category_clears_content_type() {
        let form = fotosintesis_form().apply(FormAction::SetCategory(Some(Category::Sales)));
        assert_eq!(form.content_type, "");
        assert_eq!(form.category, Some(Category::Sales));
        assert_eq!(form.topic, "Fotosintesis");
    }

    #[test]
    fn foreign_content_type_is_ignored() {
        let form = fotosintesis_form().apply(FormAction::SetContentType("Iklan Produk".into()));
        assert_eq!(form.content_type, "Materi Pembelajaran");

        let no_category = FormInput::default().apply(FormAction::SetContentType("Iklan Produk".into()));
        assert_eq!(no_category.content_type, "");
    }

    #[test]
    fn reset_clears_everything() {
        assert_eq!(fotosintesis_form().apply(FormAction::Reset), FormInput::default());
    }
}
