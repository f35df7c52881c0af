//! Skill package enumeration

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{SKILLS_DIR, required_dir, sorted_entries};
use crate::error::{Result, read_failed};

/// Name of the primary document inside a skill directory
pub const PRIMARY_DOCUMENT: &str = "SKILL.md";

/// One skill package
#[derive(Debug, Clone, PartialEq)]
pub struct SkillEntry {
    /// Directory basename, unique within a catalog
    pub name: String,
    /// Skill directory in the source tree
    pub dir: PathBuf,
    /// Absolute path of `SKILL.md`
    pub primary_document: PathBuf,
    /// Auxiliary files relative to `dir`, sorted; may be empty
    pub reference_files: Vec<PathBuf>,
}

impl SkillEntry {
    /// Every file of the skill relative to its directory, primary first.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        std::iter::once(PathBuf::from(PRIMARY_DOCUMENT)).chain(self.reference_files.iter().cloned())
    }
}

/// Enumerate `<root>/skills/*/SKILL.md`.
///
/// Directories without a primary document are not skills and are skipped.
pub fn enumerate_skills(root: &Path) -> Result<Vec<SkillEntry>> {
    let skills_dir = required_dir(root, SKILLS_DIR)?;
    let mut skills = Vec::new();

    for dir in sorted_entries(&skills_dir)? {
        if !dir.is_dir() {
            continue;
        }
        let primary_document = dir.join(PRIMARY_DOCUMENT);
        if !primary_document.is_file() {
            continue;
        }
        let Some(name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let reference_files = collect_references(&dir)?;
        skills.push(SkillEntry {
            name,
            dir,
            primary_document,
            reference_files,
        });
    }

    Ok(skills)
}

fn collect_references(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| read_failed(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(dir) else {
            continue;
        };
        if rel == Path::new(PRIMARY_DOCUMENT) || is_hidden(rel) {
            continue;
        }
        files.push(rel.to_path_buf());
    }
    files.sort();
    Ok(files)
}

fn is_hidden(rel: &Path) -> bool {
    rel.components()
        .any(|c| c.as_os_str().to_str().is_some_and(|s| s.starts_with('.')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::write;
    use tempfile::TempDir;

    #[test]
    fn test_enumerate_skills_sorted_with_references() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "skills/zeta/SKILL.md", "# Z\n");
        write(temp.path(), "skills/alpha/SKILL.md", "# A\n");
        write(temp.path(), "skills/alpha/references/b.md", "b\n");
        write(temp.path(), "skills/alpha/references/a.md", "a\n");
        write(temp.path(), "skills/alpha/.DS_Store", "x");

        let skills = enumerate_skills(temp.path()).unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].name, "alpha");
        assert_eq!(
            skills[0].reference_files,
            vec![
                PathBuf::from("references/a.md"),
                PathBuf::from("references/b.md")
            ]
        );
        assert_eq!(skills[1].name, "zeta");
        assert!(skills[1].reference_files.is_empty());
    }

    #[test]
    fn test_directory_without_primary_is_skipped() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "skills/draft/notes.md", "wip\n");
        write(temp.path(), "skills/README.md", "index\n");

        let skills = enumerate_skills(temp.path()).unwrap();
        assert!(skills.is_empty());
    }

    #[test]
    fn test_files_lists_primary_first() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "skills/alpha/SKILL.md", "# A\n");
        write(temp.path(), "skills/alpha/extra.md", "x\n");

        let skills = enumerate_skills(temp.path()).unwrap();
        let files: Vec<_> = skills[0].files().collect();
        assert_eq!(
            files,
            vec![PathBuf::from("SKILL.md"), PathBuf::from("extra.md")]
        );
    }
}
