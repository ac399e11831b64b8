use std::collections::BTreeSet;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_FILE: &str = "repo-contents.xml";

/// A file the operator chose to include, read once and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedFile {
    /// Relative to the traversal root, always `/`-separated.
    pub path: String,
    pub content: String,
    pub char_count: usize,
    pub unit_count: usize,
}

impl IncludedFile {
    /// Returns `None` for empty content; such files are never recorded.
    pub fn new(path: String, content: String, unit_count: usize) -> Option<Self> {
        let char_count = content.chars().count();
        if char_count == 0 {
            return None;
        }
        Some(Self {
            path,
            content,
            char_count,
            unit_count,
        })
    }
}

/// Static filters applied to every directory entry before anything is shown to the operator.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    pub ignored_directory_names: BTreeSet<String>,
    pub ignored_file_suffixes: BTreeSet<String>,
    pub ignored_file_names: BTreeSet<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self {
            ignored_directory_names: [".git", "__pycache__", ".vscode"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignored_file_suffixes: [".pyc"].into_iter().map(String::from).collect(),
            ignored_file_names: [DEFAULT_OUTPUT_FILE, ".DS_Store"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl IgnoreRules {
    pub fn is_ignored_directory(&self, name: &str) -> bool {
        name.starts_with('.') || self.ignored_directory_names.contains(name)
    }

    pub fn is_ignored_file(&self, name: &str) -> bool {
        name.starts_with('.')
            || self.ignored_file_names.contains(name)
            || self
                .ignored_file_suffixes
                .iter()
                .any(|suffix| name.ends_with(suffix.as_str()))
    }

    pub fn extend_directories<I: IntoIterator<Item = String>>(&mut self, names: I) {
        self.ignored_directory_names.extend(names);
    }

    pub fn extend_suffixes<I: IntoIterator<Item = String>>(&mut self, suffixes: I) {
        self.ignored_file_suffixes.extend(suffixes);
    }

    pub fn extend_file_names<I: IntoIterator<Item = String>>(&mut self, names: I) {
        self.ignored_file_names.extend(names);
    }
}

/// Level-wide answer to a files or directories prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDecision {
    All,
    None,
    OneByOne,
}

impl SelectionDecision {
    pub const ANSWERS: [&'static str; 3] = ["y", "n", "o"];

    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer {
            "y" => Some(SelectionDecision::All),
            "n" => Some(SelectionDecision::None),
            "o" => Some(SelectionDecision::OneByOne),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Console,
}

#[derive(Debug, Clone)]
pub struct BundleConfig {
    pub root_path: PathBuf,
    pub output: OutputTarget,
    pub repo_name: Option<String>,
    pub ignore_rules: IgnoreRules,
    pub auto_select: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub file_count: usize,
    pub total_chars: usize,
    pub total_units: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_included_file_rejects_empty_content() {
        assert!(IncludedFile::new("empty.txt".to_string(), String::new(), 0).is_none());

        let file = IncludedFile::new("a/ü.txt".to_string(), "größe".to_string(), 2).unwrap();
        assert_eq!(file.char_count, 5);
        assert_eq!(file.unit_count, 2);
    }

    #[test]
    fn test_default_ignore_rules() {
        let rules = IgnoreRules::default();

        assert!(rules.is_ignored_directory(".git"));
        assert!(rules.is_ignored_directory("__pycache__"));
        assert!(rules.is_ignored_directory(".hidden"));
        assert!(!rules.is_ignored_directory("src"));

        assert!(rules.is_ignored_file("ignored1.pyc"));
        assert!(rules.is_ignored_file(".nit.py"));
        assert!(rules.is_ignored_file("repo-contents.xml"));
        assert!(rules.is_ignored_file(".DS_Store"));
        assert!(!rules.is_ignored_file("main.py"));
        assert!(!rules.is_ignored_file("pyc"));
    }

    #[test]
    fn test_extend_ignore_rules() {
        let mut rules = IgnoreRules::default();
        rules.extend_directories(vec!["target".to_string()]);
        rules.extend_suffixes(vec![".lock".to_string()]);
        rules.extend_file_names(vec!["bundle.xml".to_string()]);

        assert!(rules.is_ignored_directory("target"));
        assert!(rules.is_ignored_file("Cargo.lock"));
        assert!(rules.is_ignored_file("bundle.xml"));
        assert!(!rules.is_ignored_file("Cargo.toml"));
    }

    #[test]
    fn test_selection_decision_from_answer() {
        assert_eq!(SelectionDecision::from_answer("y"), Some(SelectionDecision::All));
        assert_eq!(SelectionDecision::from_answer("n"), Some(SelectionDecision::None));
        assert_eq!(
            SelectionDecision::from_answer("o"),
            Some(SelectionDecision::OneByOne)
        );
        assert_eq!(SelectionDecision::from_answer("yes"), None);
    }
}
