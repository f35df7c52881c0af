//! Agent definition enumeration

use std::path::{Path, PathBuf};

use super::{AGENTS_DIR, required_dir, sorted_entries};
use crate::error::{Result, read_failed};
use crate::frontmatter::{self, FrontMatter};

/// One agent persona
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEntry {
    /// File stem, e.g. `reviewer` for `reviewer.md`
    pub name: String,
    /// File name as installed, e.g. `reviewer.md`
    pub file_name: String,
    pub path: PathBuf,
    /// Full file content
    pub raw: String,
    /// Parsed header, `None` when the file has no front-matter block
    pub front_matter: Option<FrontMatter>,
    /// Everything after the closing delimiter (the whole file without a header)
    pub body: String,
}

impl AgentEntry {
    /// Build an entry from file content.
    pub fn from_content(path: &Path, raw: String) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let name = path.file_stem()?.to_str()?.to_string();
        let (front_matter, body) = match frontmatter::parse_document(&raw) {
            Some((fm, body)) => (Some(fm), body.to_string()),
            None => (None, raw.clone()),
        };
        Some(Self {
            name,
            file_name,
            path: path.to_path_buf(),
            raw,
            front_matter,
            body,
        })
    }

    /// Declared name, falling back to the file stem.
    pub fn display_name(&self) -> &str {
        self.front_matter
            .as_ref()
            .and_then(|fm| fm.get_str("name"))
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// Enumerate `<root>/agents/*.md`.
pub fn enumerate_agents(root: &Path) -> Result<Vec<AgentEntry>> {
    let agents_dir = required_dir(root, AGENTS_DIR)?;
    let mut agents = Vec::new();

    for path in sorted_entries(&agents_dir)? {
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.') || n.eq_ignore_ascii_case("README.md"))
        {
            continue;
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| read_failed(&path, e))?;
        if let Some(entry) = AgentEntry::from_content(&path, raw) {
            agents.push(entry);
        }
    }

    Ok(agents)
}
