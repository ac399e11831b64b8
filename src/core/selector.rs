use crate::domain::errors::BundleError;
use crate::domain::models::{IgnoreRules, IncludedFile, SelectionDecision};
use crate::infra::file_system::{
    BinaryDetector, ListedEntry, file_size, format_size, list_directory, read_file_contents,
};
use crate::infra::prompt::{Prompter, ask_decision, confirm};
use crate::infra::tokens::TokenCounter;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// A file that was read successfully and can be offered to the operator.
struct Candidate {
    name: String,
    content: String,
    size: String,
    char_count: usize,
    unit_count: usize,
}

impl Candidate {
    fn describe(&self) -> String {
        format!(
            "{}, {} chars, ~{} tokens",
            self.size, self.char_count, self.unit_count
        )
    }
}

/// Walks a directory tree depth-first, asking the operator which files and
/// subdirectories to take at every level.
pub struct Selector<'a> {
    rules: &'a IgnoreRules,
    prompter: &'a mut dyn Prompter,
    counter: &'a dyn TokenCounter,
    detector: &'a dyn BinaryDetector,
    console: &'a mut dyn Write,
    // Canonical paths of the directories on the current recursion path.
    ancestors: HashSet<PathBuf>,
}

impl<'a> Selector<'a> {
    pub fn new(
        rules: &'a IgnoreRules,
        prompter: &'a mut dyn Prompter,
        counter: &'a dyn TokenCounter,
        detector: &'a dyn BinaryDetector,
        console: &'a mut dyn Write,
    ) -> Self {
        Self {
            rules,
            prompter,
            counter,
            detector,
            console,
            ancestors: HashSet::new(),
        }
    }

    pub fn traverse(&mut self, root: &Path) -> anyhow::Result<Vec<IncludedFile>> {
        info!("Traversing {}", root.display());
        let mut included = Vec::new();
        self.visit(root, "", &mut included)?;
        info!("Selected {} files", included.len());
        Ok(included)
    }

    fn visit(
        &mut self,
        dir: &Path,
        relative: &str,
        included: &mut Vec<IncludedFile>,
    ) -> anyhow::Result<()> {
        let identity = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !self.ancestors.insert(identity.clone()) {
            warn!("Not re-entering ancestor directory {}", dir.display());
            writeln!(
                self.console,
                "Skipping '{}': it loops back to a directory being traversed",
                dir.display()
            )?;
            return Ok(());
        }

        let result = self.visit_level(dir, relative, included);
        self.ancestors.remove(&identity);
        result
    }

    fn visit_level(
        &mut self,
        dir: &Path,
        relative: &str,
        included: &mut Vec<IncludedFile>,
    ) -> anyhow::Result<()> {
        let listing = match list_directory(dir, self.rules) {
            Ok(listing) => listing,
            Err(e) => {
                warn!("{}", e);
                writeln!(self.console, "Error reading directory {}: {}", dir.display(), e)?;
                return Ok(());
            }
        };

        let label = level_label(relative);

        if !listing.files.is_empty() {
            self.select_files(&listing.files, relative, &label, included)?;
        }

        if !listing.directories.is_empty() {
            for entry in self.select_directories(&listing.directories, &label)? {
                let child = join_relative(relative, &entry.name);
                self.visit(&entry.path, &child, included)?;
            }
        }

        Ok(())
    }

    fn select_files(
        &mut self,
        files: &[ListedEntry],
        relative: &str,
        label: &str,
        included: &mut Vec<IncludedFile>,
    ) -> anyhow::Result<()> {
        writeln!(self.console, "\nFiles in '{}':", label)?;

        let mut candidates = Vec::with_capacity(files.len());
        for entry in files {
            if let Some(candidate) = self.inspect(entry)? {
                writeln!(self.console, "  - {}: {}", candidate.name, candidate.describe())?;
                candidates.push(candidate);
            }
        }
        debug!("{} of {} files in '{}' are readable", candidates.len(), files.len(), label);

        let question = format!(
            "Include files in '{}'? (Y=all, N=none, O=one-by-one): ",
            label
        );
        let accepted: Vec<Candidate> = match ask_decision(self.prompter, &question)? {
            SelectionDecision::All => candidates,
            SelectionDecision::None => Vec::new(),
            SelectionDecision::OneByOne => {
                let mut accepted = Vec::new();
                for candidate in candidates {
                    let question = format!(
                        "Include '{}' ({})? (y/n): ",
                        candidate.name,
                        candidate.describe()
                    );
                    if confirm(self.prompter, &question)? {
                        accepted.push(candidate);
                    }
                }
                accepted
            }
        };

        for candidate in accepted {
            let path = join_relative(relative, &candidate.name);
            match IncludedFile::new(path, candidate.content, candidate.unit_count) {
                Some(file) => {
                    debug!("Including {} ({} chars)", file.path, file.char_count);
                    included.push(file);
                }
                None => debug!("Skipping empty file {}", candidate.name),
            }
        }

        Ok(())
    }

    fn select_directories<'e>(
        &mut self,
        directories: &'e [ListedEntry],
        label: &str,
    ) -> anyhow::Result<Vec<&'e ListedEntry>> {
        writeln!(self.console, "\nDirectories in '{}':", label)?;
        for entry in directories {
            writeln!(self.console, "  - {}", entry.name)?;
        }

        let question = format!(
            "Include directories in '{}'? (Y=all, N=none, O=one-by-one): ",
            label
        );
        let chosen = match ask_decision(self.prompter, &question)? {
            SelectionDecision::All => directories.iter().collect(),
            SelectionDecision::None => Vec::new(),
            SelectionDecision::OneByOne => {
                let mut chosen = Vec::new();
                for entry in directories {
                    let question = format!("Include directory '{}'? (y/n): ", entry.name);
                    if confirm(self.prompter, &question)? {
                        chosen.push(entry);
                    }
                }
                chosen
            }
        };

        Ok(chosen)
    }

    fn inspect(&mut self, entry: &ListedEntry) -> anyhow::Result<Option<Candidate>> {
        let size = match file_size(&entry.path) {
            Ok(bytes) => format_size(bytes),
            Err(e) => {
                warn!("{}", e);
                writeln!(self.console, "Error reading file {}: {}", entry.path.display(), e)?;
                return Ok(None);
            }
        };

        if self.detector.is_binary(&entry.path) {
            writeln!(
                self.console,
                "  - {}: {} (binary file, will be skipped)",
                entry.name, size
            )?;
            return Ok(None);
        }

        let content = match read_file_contents(&entry.path) {
            Ok(content) => content,
            Err(BundleError::DecodeFailure { .. }) => {
                writeln!(
                    self.console,
                    "  - {}: {} (binary or non-UTF-8 file, will be skipped)",
                    entry.name, size
                )?;
                return Ok(None);
            }
            Err(e) => {
                warn!("{}", e);
                writeln!(self.console, "Error reading file {}: {}", entry.path.display(), e)?;
                return Ok(None);
            }
        };

        let char_count = content.chars().count();
        let unit_count = self.counter.count_units(&content);
        Ok(Some(Candidate {
            name: entry.name.clone(),
            content,
            size,
            char_count,
            unit_count,
        }))
    }
}

fn level_label(relative: &str) -> String {
    if relative.is_empty() {
        ".".to_string()
    } else {
        relative.to_string()
    }
}

fn join_relative(relative: &str, name: &str) -> String {
    if relative.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", relative, name)
    }
}
