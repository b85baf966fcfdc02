//! File exports served by the admin views as attachments.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    RadiosCsv,
    RadiosXlsx,
    RadiosPdf,
    /// Tracked tracks and the playlists they appear in.
    Appearances,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [
        ExportKind::RadiosCsv,
        ExportKind::RadiosXlsx,
        ExportKind::RadiosPdf,
        ExportKind::Appearances,
    ];

    /// Used when the response names no file.
    pub fn fallback_filename(self) -> &'static str {
        match self {
            ExportKind::RadiosCsv => "radios.csv",
            ExportKind::RadiosXlsx => "radios.xlsx",
            ExportKind::RadiosPdf => "radios.pdf",
            ExportKind::Appearances => "playlists.xlsx",
        }
    }
}

/// A downloaded attachment, held in memory until saved.
#[derive(Debug, Clone)]
pub struct Download {
    pub kind: ExportKind,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write the file. A `target` that is an existing directory receives the
    /// file under its server-given name; anything else is the file path.
    pub async fn save(&self, target: &Path) -> std::io::Result<PathBuf> {
        let is_dir = tokio::fs::metadata(target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let path = if is_dir {
            target.join(&self.filename)
        } else {
            target.to_path_buf()
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!("saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// File name from a `Content-Disposition` header, without any directory
/// part the server may have put in it.
pub fn attachment_filename(header: &str) -> Option<String> {
    let raw = header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"'))
    })?;
    let name = Path::new(raw).file_name()?.to_str()?;
    (!name.is_empty()).then(|| name.to_string())
}
