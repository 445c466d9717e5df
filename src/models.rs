use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// Fixed token budget sent with every generation request
pub const MAX_TOKENS: u32 = 3000;

// Tone options offered by the creation form
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Casual,
    Friendly,
    Professional,
    Persuasive,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Persuasive => "persuasive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "formal" => Some(Tone::Formal),
            "casual" => Some(Tone::Casual),
            "friendly" => Some(Tone::Friendly),
            "professional" => Some(Tone::Professional),
            "persuasive" => Some(Tone::Persuasive),
            _ => None,
        }
    }
}

// The two content families; each has its own set of content types
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    #[serde(rename = "AI Education")]
    Education,
    #[serde(rename = "AI Sales")]
    Sales,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Education => "AI Education",
            Category::Sales => "AI Sales",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ai education" | "education" => Some(Category::Education),
            "ai sales" | "sales" => Some(Category::Sales),
            _ => None,
        }
    }

    /// Content types the form offers once this category is picked.
    pub fn content_types(&self) -> &'static [&'static str] {
        match self {
            Category::Education => &[
                "Materi Pembelajaran",
                "Soal Latihan",
                "Kuis Interaktif",
                "Penugasan",
                "Rangkuman Materi",
                "Modul Belajar",
                "Penjelasan Konsep Sulit",
            ],
            Category::Sales => &[
                "Iklan Produk",
                "Brosur / Pamflet Promosi",
                "Proposal Penawaran",
                "Email Marketing",
                "Surat Kontrak",
                "Deskripsi Produk",
                "Copywriting Sosial Media",
            ],
        }
    }

    pub fn allows(&self, content_type: &str) -> bool {
        self.content_types().contains(&content_type)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    Medium,
    Long,
    Extended,
}

impl Length {
    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
            Length::Extended => "extended",
        }
    }

    // Label shown next to the option in the form
    pub fn label(&self) -> &'static str {
        match self {
            Length::Short => "Pendek (100–300 kata)",
            Length::Medium => "Sedang (300–600 kata)",
            Length::Long => "Panjang (600–1000 kata)",
            Length::Extended => "Sangat Panjang (1000+ kata)",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "short" => Some(Length::Short),
            "medium" => Some(Length::Medium),
            "long" => Some(Length::Long),
            "extended" => Some(Length::Extended),
            _ => None,
        }
    }
}

// Raw form fields as the UI holds them. Unselected options are None.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FormInput {
    pub topic: String,
    pub keywords: String,
    pub tone: Option<Tone>,
    pub category: Option<Category>,
    pub content_type: String,
    pub length: Option<Length>,
}

// Payload posted to the generation endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub topic: String,
    pub keywords: String,
    pub tone: String,
    pub category: String,
    pub content_type: String,
    pub length: String,
    pub max_tokens: u32,
}

// Response body of the generation endpoint. `result` may be missing.
#[derive(Deserialize, Debug, Default)]
pub struct GenerationResponse {
    #[serde(default)]
    pub result: Option<String>,
}

// A generated document, either fresh from generation (no id yet) or
// normalized from a history record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub topic: String,
    pub content: String,
    pub category: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// History records as the backend returns them. No field is guaranteed.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct HistoryRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HistoryRecord {
    /// Validates and defaults a wire record into a `Document`.
    pub fn into_document(self) -> Document {
        let id = match self.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                if !other.is_null() {
                    log::debug!("Ignoring history record id of unexpected shape: {}", other);
                }
                None
            }
            None => None,
        };

        let created_at = self.created_at.as_deref().and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                log::debug!("Unparseable created_at on history record: {}", raw);
            }
            parsed
        });

        Document {
            id,
            topic: self.topic.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            content_type: self.content_type.unwrap_or_default(),
            created_at,
        }
    }
}

// Body posted to the history endpoint when archiving a generation
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub topic: String,
    pub content: String,
    pub created_at: String,
    pub category: String,
    pub content_type: String,
    pub keywords: String,
    pub tone: String,
    pub length: String,
}

impl ArchiveEntry {
    pub fn new(request: &GenerationRequest, document: &Document) -> Self {
        let created_at = document.created_at.unwrap_or_else(Utc::now);
        Self {
            topic: document.topic.clone(),
            content: document.content.clone(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            category: request.category.clone(),
            content_type: request.content_type.clone(),
            keywords: request.keywords.clone(),
            tone: request.tone.clone(),
            length: request.length.clone(),
        }
    }
}

/// Parses ISO-8601 timestamps. Values with an offset are taken as-is; naive
/// values (as written by `datetime.now().isoformat()`) are read as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_content_types_are_disjoint() {
        for ct in Category::Education.content_types() {
            assert!(!Category::Sales.allows(ct));
        }
        assert!(Category::Sales.allows("Email Marketing"));
    }

    #[test]
    fn length_labels_match_the_form() {
        let labels: Vec<_> = [Length::Short, Length::Medium, Length::Long, Length::Extended]
            .iter()
            .map(Length::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Pendek (100–300 kata)",
                "Sedang (300–600 kata)",
                "Panjang (600–1000 kata)",
                "Sangat Panjang (1000+ kata)",
            ]
        );
    }

    #[test]
    fn request_serializes_with_wire_field_names() {
        let request = GenerationRequest {
            prompt: "p".into(),
            topic: "t".into(),
            keywords: "k".into(),
            tone: "formal".into(),
            category: "AI Sales".into(),
            content_type: "Iklan Produk".into(),
            length: "short".into(),
            max_tokens: MAX_TOKENS,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["content_type"], "Iklan Produk");
        assert_eq!(value["max_tokens"], 3000);
    }

    #[test]
    fn record_with_numeric_id_and_missing_fields_is_defaulted() {
        let record: HistoryRecord = serde_json::from_value(json!({
            "id": 42,
            "topic": "Fotosintesis",
            "created_at": "2024-05-01T08:30:00.123456+00:00"
        }))
        .unwrap();
        let doc = record.into_document();
        assert_eq!(doc.id.as_deref(), Some("42"));
        assert_eq!(doc.content, "");
        assert_eq!(doc.category, "");
        assert_eq!(
            doc.created_at.unwrap().to_rfc3339(),
            "2024-05-01T08:30:00.123456+00:00"
        );
    }

    #[test]
    fn garbage_timestamp_becomes_none() {
        let record = HistoryRecord {
            created_at: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(record.into_document().created_at.is_none());
    }

    #[test]
    fn naive_timestamp_is_parsed() {
        assert!(parse_timestamp("2024-05-01T08:30:00.5").is_some());
        assert!(parse_timestamp("2024-05-01T08:30:00").is_some());
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!(Tone::parse("Formal"), Some(Tone::Formal));
        assert_eq!(Category::parse("AI Education"), Some(Category::Education));
        assert_eq!(Length::parse("EXTENDED"), Some(Length::Extended));
        assert_eq!(Length::parse("huge"), None);
    }
}
