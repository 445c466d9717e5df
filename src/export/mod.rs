//! Turns a finished document into downloadable files.
//!
//! Every target is a pure function of `(topic, content)` that returns an
//! [`ExportArtifact`]; writing the bytes to disk is a separate step.

pub mod pdf;
pub mod slides;
pub mod text;

use crate::error::ExportError;
use serde::Serialize;
use std::path::{Path, PathBuf};

// File stem used when the topic is blank
pub const DEFAULT_FILE_STEM: &str = "hasil_konten";
// Heading used when the topic is blank
pub const DEFAULT_TITLE: &str = "Hasil Konten";

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Pdf,
    Slides,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Slides => "pptx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain;charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Slides => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "txt" | "text" => Some(ExportFormat::Text),
            "pdf" => Some(ExportFormat::Pdf),
            "pptx" | "slides" | "ppt" => Some(ExportFormat::Slides),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// `{topic}.{ext}`, or `hasil_konten.{ext}` for a blank topic. Path
/// separators in the topic become underscores.
pub fn file_name(topic: &str, format: ExportFormat) -> String {
    let topic = topic.trim();
    let stem = if topic.is_empty() {
        DEFAULT_FILE_STEM.to_string()
    } else {
        topic
            .chars()
            .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
            .collect()
    };
    format!("{}.{}", stem, format.extension())
}

/// Refuses blank content before any export target runs.
pub fn ensure_content(content: &str) -> Result<(), ExportError> {
    if content.trim().is_empty() {
        log::warn!("Export refused: no content");
        return Err(ExportError::EmptyContent);
    }
    Ok(())
}

/// Runs the export target for `format`.
pub fn export(format: ExportFormat, topic: &str, content: &str) -> Result<ExportArtifact, ExportError> {
    match format {
        ExportFormat::Text => text::export_text(topic, content),
        ExportFormat::Pdf => pdf::export_pdf(topic, content),
        ExportFormat::Slides => slides::export_slides(topic, content),
    }
}

/// Writes the artifact into `dir` and returns the full path.
pub async fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes).await?;
    log::info!("Exported {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_falls_back_for_blank_topic() {
        assert_eq!(file_name("", ExportFormat::Text), "hasil_konten.txt");
        assert_eq!(file_name("   ", ExportFormat::Pdf), "hasil_konten.pdf");
        assert_eq!(file_name("Fotosintesis", ExportFormat::Slides), "Fotosintesis.pptx");
    }

    #[test]
    fn file_name_neutralizes_separators() {
        assert_eq!(file_name("Brosur / Pamflet", ExportFormat::Text), "Brosur _ Pamflet.txt");
    }

    #[test]
    fn every_target_refuses_blank_content() {
        for format in [ExportFormat::Text, ExportFormat::Pdf, ExportFormat::Slides] {
            assert!(matches!(export(format, "Topik", " \n "), Err(ExportError::EmptyContent)));
        }
    }

    #[tokio::test]
    async fn artifact_is_written_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = export(ExportFormat::Text, "Catatan", "isi").unwrap();
        let path = write_artifact(dir.path(), &artifact).await.unwrap();
        assert_eq!(path, dir.path().join("Catatan.txt"));
        assert_eq!(std::fs::read(path).unwrap(), b"isi");
    }
}
