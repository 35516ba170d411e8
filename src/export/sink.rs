//! Delivery of encoded exports.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};

/// Hands a finished PNG to wherever the user receives downloads.
pub trait ExportSink {
    /// Delivers `png` under `file_name`; returns a description of where it
    /// went (a path, a URL, ...).
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> std::io::Result<String>;
}

/// Writes exports into a directory, replacing any file of the same name.
#[derive(Debug, Clone)]
pub struct DownloadDirSink {
    dir: PathBuf,
}

impl DownloadDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform download directory, falling back to home, then `.`.
    pub fn user_downloads() -> Self {
        let dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DownloadDirSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> std::io::Result<String> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, png)?;
        Ok(path.display().to_string())
    }
}

/// Keeps exports as `data:` URLs, for hosts that hand them to a webview.
#[derive(Debug, Clone, Default)]
pub struct DataUrlSink {
    pub last: Option<(String, String)>,
}

impl ExportSink for DataUrlSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> std::io::Result<String> {
        let url = to_data_url(png);
        self.last = Some((file_name.to_string(), url));
        Ok(format!("data URL for {file_name}"))
    }
}

/// Collects every delivery in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> std::io::Result<String> {
        self.files.push((file_name.to_string(), png.to_vec()));
        Ok(format!("memory #{}", self.files.len()))
    }
}

/// `data:image/png;base64,...` for PNG bytes.
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_has_png_prefix() {
        let url = to_data_url(&[0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn data_url_sink_keeps_last_delivery() {
        let mut sink = DataUrlSink::default();
        sink.deliver("download.png", b"old").unwrap();
        let location = sink.deliver("download.png", &[0x89, 0x50, 0x4E, 0x47]).unwrap();

        assert_eq!(location, "data URL for download.png");
        let (name, url) = sink.last.as_ref().unwrap();
        assert_eq!(name, "download.png");
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn download_dir_sink_replaces_existing_file() {
        let dir = std::env::temp_dir().join(format!("snapcrop-sink-{}", std::process::id()));
        let mut sink = DownloadDirSink::new(&dir);

        sink.deliver("download.png", b"first").unwrap();
        let location = sink.deliver("download.png", b"second").unwrap();

        assert!(location.ends_with("download.png"));
        assert_eq!(std::fs::read(dir.join("download.png")).unwrap(), b"second");
        std::fs::remove_dir_all(&dir).ok();
    }
}
