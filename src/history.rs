use crate::api::HistoryBackend;
use crate::models::Document;
use crate::sanitize::sanitize_preview;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

// Number of entries in the dashboard's recent activity list
pub const RECENT_LIMIT: usize = 5;
// Characters of content shown in a history list preview
pub const PREVIEW_CHARS: usize = 180;
pub const UNTITLED: &str = "Tanpa Judul";
pub const NO_CONTENT_YET: &str = "Belum ada konten yang dibuat.";

const EDUCATION_KEYWORDS: &[&str] = &["education", "edukasi"];
const SALES_KEYWORDS: &[&str] = &["sales", "marketing", "copywriting"];

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Education,
    Sales,
}

impl CategoryFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" | "" => Some(CategoryFilter::All),
            "education" => Some(CategoryFilter::Education),
            "sales" => Some(CategoryFilter::Sales),
            _ => None,
        }
    }

    /// Keyword match against a stored category string. Records written at
    /// different times spell categories differently, so this is not an exact
    /// comparison.
    pub fn matches(&self, category: &str) -> bool {
        let keywords = match self {
            CategoryFilter::All => return true,
            CategoryFilter::Education => EDUCATION_KEYWORDS,
            CategoryFilter::Sales => SALES_KEYWORDS,
        };
        let category = category.to_lowercase();
        keywords.iter().any(|k| category.contains(k))
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum ContentTypeFilter {
    #[default]
    All,
    Exact(String),
}

impl ContentTypeFilter {
    pub fn matches(&self, content_type: &str) -> bool {
        match self {
            ContentTypeFilter::All => true,
            ContentTypeFilter::Exact(wanted) => wanted == content_type,
        }
    }
}

// Filter state of the history view
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub category: CategoryFilter,
    pub content_type: ContentTypeFilter,
}

impl HistoryFilter {
    // Choosing a category always resets the content type filter
    pub fn with_category(self, category: CategoryFilter) -> Self {
        HistoryFilter {
            category,
            content_type: ContentTypeFilter::All,
        }
    }

    // A specific content type can only be picked once a category is chosen
    pub fn with_content_type(self, content_type: ContentTypeFilter) -> Self {
        if self.category == CategoryFilter::All && content_type != ContentTypeFilter::All {
            log::debug!("Ignoring content type filter without a category");
            return self;
        }
        HistoryFilter { content_type, ..self }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.category.matches(&doc.category) && self.content_type.matches(&doc.content_type)
    }
}

/// Returns the documents that pass `filter`, keeping their order.
pub fn filter(docs: &[Document], filter: &HistoryFilter) -> Vec<Document> {
    docs.iter().filter(|d| filter.matches(d)).cloned().collect()
}

/// Newest first. Stable, and documents without a timestamp go last.
pub fn sort_newest_first(mut docs: Vec<Document>) -> Vec<Document> {
    docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    docs
}

/// Looks a document up by its backend id.
pub fn find_by_id<'a>(docs: &'a [Document], id: &str) -> Option<&'a Document> {
    docs.iter().find(|d| d.id.as_deref() == Some(id))
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub today: usize,
    pub distinct_content_types: usize,
}

impl DashboardStats {
    pub fn compute(docs: &[Document], today: NaiveDate) -> Self {
        let created_today = docs
            .iter()
            .filter(|d| d.created_at.map_or(false, |ts| local_date(ts) == today))
            .count();
        let content_types: HashSet<&str> = docs
            .iter()
            .map(|d| d.content_type.as_str())
            .filter(|ct| !ct.is_empty())
            .collect();

        DashboardStats {
            total: docs.len(),
            today: created_today,
            distinct_content_types: content_types.len(),
        }
    }
}

fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

// One line of the history list
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HistoryListItem {
    pub id: Option<String>,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub preview: String,
}

impl HistoryListItem {
    pub fn from_document(doc: &Document) -> Self {
        HistoryListItem {
            id: doc.id.clone(),
            title: display_topic(&doc.topic).to_string(),
            created_at: doc.created_at,
            preview: preview(&doc.content),
        }
    }
}

pub fn display_topic(topic: &str) -> &str {
    if topic.trim().is_empty() {
        UNTITLED
    } else {
        topic
    }
}

/// Single-line, truncated rendition of the content for list rows.
pub fn preview(content: &str) -> String {
    let cleaned = sanitize_preview(content);
    let truncated: String = cleaned.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", truncated)
}

/// Reads past documents from the history backend.
#[derive(Clone)]
pub struct HistoryRepository {
    backend: Arc<dyn HistoryBackend>,
}

impl HistoryRepository {
    pub fn new(backend: Arc<dyn HistoryBackend>) -> Self {
        Self { backend }
    }

    /// Fetches every document, newest first. A failed fetch logs and yields an
    /// empty list, so callers can't tell "no history" from "fetch failed".
    pub async fn fetch_all(&self) -> Vec<Document> {
        match self.backend.list().await {
            Ok(records) => {
                let docs = records.into_iter().map(|r| r.into_document()).collect();
                sort_newest_first(docs)
            }
            Err(e) => {
                log::warn!("Failed to fetch history, showing none: {:?}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(id: &str, category: &str, content_type: &str, ts: Option<i64>) -> Document {
        Document {
            id: Some(id.to_string()),
            topic: format!("topik {}", id),
            content: "isi".into(),
            category: category.into(),
            content_type: content_type.into(),
            created_at: ts.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
        }
    }

    fn sample() -> Vec<Document> {
        vec![
            doc("1", "AI Education", "Soal Latihan", Some(100)),
            doc("2", "AI Sales", "Iklan Produk", Some(300)),
            doc("3", "edukasi", "Modul Belajar", Some(200)),
            doc("4", "Digital Marketing", "Email Marketing", None),
            doc("5", "Copywriting", "Iklan Produk", Some(300)),
            doc("6", "", "", Some(50)),
        ]
    }

    #[test]
    fn education_filter_uses_keywords() {
        let f = HistoryFilter::default().with_category(CategoryFilter::Education);
        let out = filter(&sample(), &f);
        let ids: Vec<_> = out.iter().map(|d| d.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        for d in &out {
            let c = d.category.to_lowercase();
            assert!(c.contains("education") || c.contains("edukasi"));
        }
    }

    #[test]
    fn sales_filter_uses_keywords() {
        let f = HistoryFilter::default().with_category(CategoryFilter::Sales);
        let out = filter(&sample(), &f);
        assert_eq!(out.len(), 3);
        for d in &out {
            let c = d.category.to_lowercase();
            assert!(c.contains("sales") || c.contains("marketing") || c.contains("copywriting"));
        }
    }

    #[test]
    fn content_type_filter_is_exact_and_idempotent() {
        let f = HistoryFilter::default()
            .with_category(CategoryFilter::Sales)
            .with_content_type(ContentTypeFilter::Exact("Iklan Produk".into()));
        let once = filter(&sample(), &f);
        assert_eq!(once.len(), 2);
        assert_eq!(filter(&once, &f), once);
    }

    #[test]
    fn content_type_needs_a_category() {
        let f = HistoryFilter::default()
            .with_content_type(ContentTypeFilter::Exact("Iklan Produk".into()));
        assert_eq!(f.content_type, ContentTypeFilter::All);
    }

    #[test]
    fn changing_category_resets_content_type() {
        let f = HistoryFilter::default()
            .with_category(CategoryFilter::Education)
            .with_content_type(ContentTypeFilter::Exact("Soal Latihan".into()))
            .with_category(CategoryFilter::Sales);
        assert_eq!(f.content_type, ContentTypeFilter::All);
    }

    #[test]
    fn filtering_does_not_touch_the_source() {
        let docs = sample();
        let before = docs.clone();
        let _ = filter(&docs, &HistoryFilter::default().with_category(CategoryFilter::Sales));
        assert_eq!(docs, before);
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let sorted = sort_newest_first(sample());
        for pair in sorted.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        let ids: Vec<_> = sorted.iter().map(|d| d.id.clone().unwrap()).collect();
        // "2" and "5" share a timestamp and keep their input order
        assert_eq!(ids, vec!["2", "5", "3", "1", "6", "4"]);
    }

    #[test]
    fn stats_over_empty_history_are_zero() {
        let today = Local::now().date_naive();
        assert_eq!(DashboardStats::compute(&[], today), DashboardStats::default());
    }

    #[test]
    fn stats_count_today_and_distinct_types() {
        let now = Utc::now();
        let mut docs = sample();
        docs[0].created_at = Some(now);
        docs[1].created_at = Some(now);
        let stats = DashboardStats::compute(&docs, local_date(now));
        assert_eq!(stats.total, 6);
        assert_eq!(stats.today, 2);
        // Soal Latihan, Iklan Produk, Modul Belajar, Email Marketing
        assert_eq!(stats.distinct_content_types, 4);
    }

    #[test]
    fn find_by_id_misses_cleanly() {
        let docs = sample();
        assert_eq!(find_by_id(&docs, "3").unwrap().category, "edukasi");
        assert!(find_by_id(&docs, "99").is_none());
    }

    #[test]
    fn preview_is_single_line_and_truncated() {
        let long = format!("**Judul**\n{}", "a".repeat(400));
        let p = preview(&long);
        assert!(!p.contains('\n'));
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.starts_with("Judul a"));
    }

    #[test]
    fn blank_topic_shows_untitled() {
        assert_eq!(display_topic(""), UNTITLED);
        assert_eq!(display_topic("Fotosintesis"), "Fotosintesis");
    }
}
