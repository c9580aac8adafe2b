use crate::domain::models::OutputTarget;
use anyhow::Context;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to file: {}", self.path.display());
        fs::write(&self.path, content)
            .with_context(|| format!("cannot write {}", self.path.display()))?;
        info!("Output successfully written to '{}'", self.path.display());
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to console");
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

pub fn create_writer(target: &OutputTarget) -> Box<dyn OutputWriter> {
    match target {
        OutputTarget::File(path) => Box::new(FileWriter::new(path.clone())),
        OutputTarget::Stdout => Box::new(ConsoleWriter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_file_writer_overwrites() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        fs::write(&path, "stale content that is longer").unwrap();

        let writer = FileWriter::new(path.clone());
        writer.write("{}\n").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "{}\n");
    }

    #[test]
    fn test_file_writer_reports_bad_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no/such/dir/output.json");

        let err = FileWriter::new(path).write("{}").unwrap_err();
        assert!(format!("{err:#}").contains("output.json"));
    }

    #[test]
    fn test_create_writer_for_file_target() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");

        create_writer(&OutputTarget::File(path.clone()))
            .write("[]")
            .unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }
}
