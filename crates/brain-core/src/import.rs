//! Import intake: file type detection and text extraction.

use crate::error::{Error, Result};
use crate::traits::DocumentConverter;

pub const UNSUPPORTED_FILE_MESSAGE: &str =
    "Unsupported file type. Please upload .txt, .md, or .docx";

pub const NO_CONTENT_MESSAGE: &str =
    "No content found. Make sure the file has paragraphs separated by blank lines.";

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Text,
    Markdown,
    Docx,
}

impl ImportFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" => Ok(Self::Text),
            "md" => Ok(Self::Markdown),
            "docx" => Ok(Self::Docx),
            _ => Err(Error::UnsupportedInput(UNSUPPORTED_FILE_MESSAGE.to_string())),
        }
    }

    pub fn needs_conversion(&self) -> bool {
        matches!(self, Self::Docx)
    }
}

/// Extract plain text from an upload, converting word documents as needed.
///
/// Line endings are normalized to `\n` so paragraph breaks are detected the
/// same way regardless of the platform that wrote the file.
pub async fn extract_text(
    data: &[u8],
    filename: &str,
    converter: &dyn DocumentConverter,
) -> Result<String> {
    let text = match ImportFormat::from_filename(filename)? {
        ImportFormat::Text | ImportFormat::Markdown => String::from_utf8_lossy(data).into_owned(),
        ImportFormat::Docx => converter.to_plain_text(data, filename).await?,
    };
    Ok(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Source title recorded on imported cards: the filename minus its last
/// extension.
pub fn source_title_for(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}
