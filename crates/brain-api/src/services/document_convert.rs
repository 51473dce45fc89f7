//! Word document conversion through pandoc.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use brain_core::{DocumentConverter, Error, Result};

/// Converts `.docx` uploads to plain text with an external pandoc binary.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    binary: String,
    timeout: Duration,
}

impl PandocConverter {
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Whether the configured binary runs at all.
    pub async fn health_check(&self) -> bool {
        match Command::new(&self.binary).arg("--version").output().await {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
}

/// Run a command with a timeout, returning stdout as a string.
async fn run_cmd_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<String> {
    let output = tokio::time::timeout(timeout, cmd.kill_on_drop(true).output())
        .await
        .map_err(|_| {
            Error::Conversion(format!(
                "Document conversion timed out after {}s",
                timeout.as_secs()
            ))
        })?
        .map_err(|e| Error::Conversion(format!("Failed to run document converter: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Conversion(format!(
            "Document conversion failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl DocumentConverter for PandocConverter {
    async fn to_plain_text(&self, data: &[u8], filename: &str) -> Result<String> {
        if data.is_empty() {
            return Err(Error::UnsupportedInput(
                "Cannot convert an empty document".to_string(),
            ));
        }

        let mut tmpfile = tempfile::Builder::new()
            .suffix(".docx")
            .tempfile()
            .map_err(|e| Error::Internal(format!("Failed to create temp file: {}", e)))?;
        tmpfile
            .write_all(data)
            .map_err(|e| Error::Internal(format!("Failed to write temp file: {}", e)))?;

        debug!(
            subsystem = "import",
            component = "pandoc",
            op = "convert",
            filename,
            bytes = data.len(),
            "Converting document with pandoc"
        );

        // pandoc -f docx -t plain --wrap=none INPUT
        run_cmd_with_timeout(
            Command::new(&self.binary)
                .arg("-f")
                .arg("docx")
                .arg("-t")
                .arg("plain")
                .arg("--wrap=none")
                .arg(tmpfile.path()),
            self.timeout,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let converter = PandocConverter::new("pandoc", 5);
        let err = converter.to_plain_text(b"", "a.docx").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_conversion_error() {
        let converter = PandocConverter::new("/nonexistent/pandoc-binary", 5);
        let err = converter
            .to_plain_text(b"PK\x03\x04", "a.docx")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
        assert!(!converter.health_check().await);
    }
}
