use crate::domain::errors::BundleError;
use crate::domain::models::IgnoreRules;
use log::{debug, warn};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const BINARY_FILE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "pdf", "zip", "tar", "gz"];
const BINARY_SNIFF_LEN: u64 = 1024;

pub trait BinaryDetector {
    fn is_binary(&self, path: &Path) -> bool;
}

/// Flags well-known binary extensions, or any file with a NUL byte in its first kilobyte.
#[derive(Debug, Default)]
pub struct HeuristicBinaryDetector;

impl BinaryDetector for HeuristicBinaryDetector {
    fn is_binary(&self, path: &Path) -> bool {
        let known_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                BINARY_FILE_EXTENSIONS
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(e))
            })
            .unwrap_or(false);
        if known_extension {
            return true;
        }

        let mut head = Vec::new();
        match fs::File::open(path).and_then(|f| f.take(BINARY_SNIFF_LEN).read_to_end(&mut head)) {
            Ok(_) => head.contains(&0),
            Err(e) => {
                debug!("Treating unreadable file {} as binary: {}", path.display(), e);
                true
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub path: PathBuf,
}

/// One directory level after ignore rules, each half sorted by name.
#[derive(Debug, Default)]
pub struct DirectoryListing {
    pub files: Vec<ListedEntry>,
    pub directories: Vec<ListedEntry>,
}

pub fn list_directory(dir: &Path, rules: &IgnoreRules) -> Result<DirectoryListing, BundleError> {
    debug!("Listing directory: {}", dir.display());
    let mut listing = DirectoryListing::default();

    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(BundleError::DirectoryUnreadable {
                    path: dir.to_path_buf(),
                    source: io::Error::from(e),
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if rules.is_ignored_directory(&name) {
                debug!("Ignoring directory: {}", entry.path().display());
                continue;
            }
            listing.directories.push(ListedEntry {
                name,
                path: entry.into_path(),
            });
        } else if file_type.is_file() {
            if rules.is_ignored_file(&name) {
                debug!("Ignoring file: {}", entry.path().display());
                continue;
            }
            listing.files.push(ListedEntry {
                name,
                path: entry.into_path(),
            });
        } else {
            debug!("Skipping special entry: {}", entry.path().display());
        }
    }

    debug!(
        "Found {} files and {} directories in {}",
        listing.files.len(),
        listing.directories.len(),
        dir.display()
    );
    Ok(listing)
}

pub fn file_size(path: &Path) -> Result<u64, BundleError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| BundleError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })
}

/// `\r\n` and lone `\r` become `\n`.
pub fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Reads the whole file and closes it before returning. Line endings are normalized.
pub fn read_file_contents(path: &Path) -> Result<String, BundleError> {
    debug!("Reading file contents: {}", path.display());
    let bytes = fs::read(path).map_err(|source| BundleError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let contents = String::from_utf8(bytes).map_err(|_| BundleError::DecodeFailure {
        path: path.to_path_buf(),
    })?;
    debug!("Read {} bytes from file", contents.len());
    Ok(normalize_newlines(contents))
}

pub fn format_size(num_bytes: u64) -> String {
    if num_bytes < 1024 {
        format!("{} B", num_bytes)
    } else {
        format!("{:.1} KB", num_bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_contents() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "Test content").unwrap();
        }

        let contents = read_file_contents(&file_path).unwrap();
        assert_eq!(contents, "Test content\n");
    }

    #[test]
    fn test_read_normalizes_line_endings() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("windows.txt");
        fs::write(&file_path, "a\r\nb\r\n").unwrap();

        let contents = read_file_contents(&file_path).unwrap();
        assert_eq!(contents, "a\nb\n");
        assert_eq!(contents.chars().count(), 4);

        assert_eq!(normalize_newlines("x\ry\r\n\rz".to_string()), "x\ny\n\nz");
        assert_eq!(normalize_newlines("plain\n".to_string()), "plain\n");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nonexistent.txt");

        let err = read_file_contents(&file_path).unwrap_err();
        assert!(matches!(err, BundleError::FileUnreadable { .. }));
    }

    #[test]
    fn test_read_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("latin1.txt");
        fs::write(&file_path, [0x63, 0x61, 0x66, 0xe9]).unwrap();

        let err = read_file_contents(&file_path).unwrap_err();
        assert!(matches!(err, BundleError::DecodeFailure { .. }));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10240.0 KB");
    }

    #[test]
    fn test_binary_detection() {
        let temp_dir = TempDir::new().unwrap();
        let text = temp_dir.path().join("notes.txt");
        let nul = temp_dir.path().join("data.bin");
        let image = temp_dir.path().join("logo.PNG");
        fs::write(&text, "plain text").unwrap();
        fs::write(&nul, b"abc\0def").unwrap();
        fs::write(&image, "not really an image").unwrap();

        let detector = HeuristicBinaryDetector;
        assert!(!detector.is_binary(&text));
        assert!(detector.is_binary(&nul));
        assert!(detector.is_binary(&image));
        assert!(detector.is_binary(&temp_dir.path().join("missing.txt")));
    }

    #[test]
    fn test_list_directory_sorts_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("Z.txt"), "Z").unwrap();
        fs::write(root.join("skip.pyc"), "x").unwrap();
        fs::write(root.join(".env"), "x").unwrap();
        fs::write(root.join("repo-contents.xml"), "x").unwrap();
        fs::create_dir(root.join("src")).unwrap();
        fs::create_dir(root.join("__pycache__")).unwrap();
        fs::create_dir(root.join(".git")).unwrap();

        let listing = list_directory(root, &IgnoreRules::default()).unwrap();

        let files: Vec<_> = listing.files.iter().map(|e| e.name.as_str()).collect();
        let dirs: Vec<_> = listing.directories.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(files, vec!["Z.txt", "a.txt", "b.txt"]);
        assert_eq!(dirs, vec!["src"]);
        assert_eq!(listing.files[1].path, root.join("a.txt"));
    }

    #[test]
    fn test_list_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");

        let err = list_directory(&missing, &IgnoreRules::default()).unwrap_err();
        assert!(matches!(err, BundleError::DirectoryUnreadable { .. }));
    }
}
