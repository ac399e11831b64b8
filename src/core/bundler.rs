use crate::domain::models::{IncludedFile, RunSummary};
use log::debug;
use quick_xml::escape::escape;

pub fn summarize(files: &[IncludedFile]) -> RunSummary {
    RunSummary {
        file_count: files.len(),
        total_chars: files.iter().map(|f| f.char_count).sum(),
        total_units: files.iter().map(|f| f.unit_count).sum(),
    }
}

/// Renders the repository document: an index of `/path` lines followed by one
/// `<file>` block per entry, both in the order given.
pub fn serialize(repo_name: &str, files: &[IncludedFile]) -> String {
    debug!("Serializing {} files for repo {}", files.len(), repo_name);
    let mut lines = Vec::with_capacity(files.len() * 4 + 4);

    lines.push(format!("<repo name=\"{}\">", escape(repo_name)));

    lines.push("  <directory structure>".to_string());
    for file in files {
        lines.push(format!("    /{}", escape(file.path.as_str())));
    }
    lines.push("  </directory>\n".to_string());

    for file in files {
        lines.push(format!("  <file path=\"{}\">", escape(file.path.as_str())));
        lines.push(format!("    {}", escape(file.content.as_str())));
        lines.push("  </file>\n".to_string());
    }

    lines.push("</repo>".to_string());
    lines.join("\n")
}
