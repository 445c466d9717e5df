use super::{ensure_content, file_name, ExportArtifact, ExportFormat};
use crate::error::ExportError;

/// Plain UTF-8 text, content written byte-for-byte.
pub fn export_text(topic: &str, content: &str) -> Result<ExportArtifact, ExportError> {
    ensure_content(content)?;
    Ok(ExportArtifact {
        file_name: file_name(topic, ExportFormat::Text),
        mime_type: ExportFormat::Text.mime_type(),
        bytes: content.as_bytes().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_kept_verbatim() {
        let content = "Baris satu\n\n  Baris dua dengan spasi  \n";
        let artifact = export_text("Fotosintesis", content).unwrap();
        assert_eq!(artifact.file_name, "Fotosintesis.txt");
        assert_eq!(artifact.bytes, content.as_bytes());
    }
}
