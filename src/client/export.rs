//! Destination for exported session snapshots

use std::path::PathBuf;

use crate::{Error, Result};

/// Accepts a named document and returns where it ended up
pub trait ExportSink {
    /// # Errors
    ///
    /// Returns `Error::Export` if the document cannot be written
    fn write(&mut self, file_name: &str, contents: &str) -> Result<String>;
}

/// Writes exports as files into one directory
#[derive(Debug, Clone)]
pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ExportSink for DirectoryExportSink {
    fn write(&mut self, file_name: &str, contents: &str) -> Result<String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Export(format!("{}: {e}", self.dir.display())))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, contents)
            .map_err(|e| Error::Export(format!("{}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), bytes = contents.len(), "session exported");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectoryExportSink::new(dir.path().join("exports"));

        let location = sink.write("a.json", "{}").unwrap();
        assert!(location.ends_with("a.json"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("exports/a.json")).unwrap(),
            "{}"
        );
    }
}
