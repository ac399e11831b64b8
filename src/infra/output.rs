use crate::domain::errors::BundleError;
use crate::domain::models::OutputTarget;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub trait OutputWriter {
    fn write(&self, content: &str) -> Result<(), BundleError>;

    /// Where the document ends up, for operator messages.
    fn destination(&self) -> String;
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
    fn write(&self, content: &str) -> Result<(), BundleError> {
        debug!("Writing output to file: {}", self.path.display());
        fs::write(&self.path, content).map_err(|source| BundleError::OutputWriteFailure {
            path: self.path.clone(),
            source,
        })?;
        info!("Output written to file: {}", self.path.display());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> Result<(), BundleError> {
        debug!("Writing output to console");
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .and_then(|_| stdout.write_all(b"\n"))
            .and_then(|_| stdout.flush())
            .map_err(|source| BundleError::OutputWriteFailure {
                path: PathBuf::from("<stdout>"),
                source,
            })
    }

    fn destination(&self) -> String {
        "standard output".to_string()
    }
}

pub fn create_writer(target: &OutputTarget) -> Box<dyn OutputWriter> {
    match target {
        OutputTarget::File(path) => Box::new(FileWriter::new(path.clone())),
        OutputTarget::Console => Box::new(ConsoleWriter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_file_writer() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        let writer = FileWriter::new(path.clone());
        let content = "<repo name=\"x\">\n</repo>";

        writer.write(content).unwrap();

        let read_content = fs::read_to_string(path).unwrap();
        assert_eq!(read_content, content);
    }

    #[test]
    fn test_file_writer_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no-such-dir").join("out.xml");
        let writer = FileWriter::new(path);

        let err = writer.write("data").unwrap_err();
        assert!(matches!(err, BundleError::OutputWriteFailure { .. }));
    }

    #[test]
    fn test_create_writer() {
        let file_writer = create_writer(&OutputTarget::File(PathBuf::from("bundle.xml")));
        assert_eq!(file_writer.destination(), "bundle.xml");

        let console_writer = create_writer(&OutputTarget::Console);
        assert_eq!(console_writer.destination(), "standard output");
    }
}
