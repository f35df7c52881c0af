//! Common test utilities for agentic-skills integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Temporary project, home and target roots for one test
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Project directory the binary runs in
    pub path: PathBuf,
    /// Stand-in for the user's home directory
    pub home: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("project");
        let home = temp.path().join("home");
        std::fs::create_dir_all(&path).expect("Failed to create project directory");
        std::fs::create_dir_all(&home).expect("Failed to create home directory");
        Self { temp, path, home }
    }

    /// Command running in the project directory with a private home
    pub fn cmd(&self) -> Command {
        let mut cmd = agentic_cmd();
        cmd.current_dir(&self.path);
        cmd.env("HOME", &self.home);
        cmd
    }

    /// Target root for `--target-dir`
    pub fn target(&self, name: &str) -> PathBuf {
        self.temp.path().join("targets").join(name)
    }

    /// Copy the fixture source so a test can modify it
    pub fn copy_source(&self) -> PathBuf {
        let dst = self.temp.path().join("source");
        copy_dir_recursive(&fixture_source(), &dst).expect("Failed to copy fixture source");
        dst
    }

    /// Copy the fixture source into a git repository and return its URL
    pub fn git_source(&self) -> (PathBuf, String) {
        let repo_dir = self.temp.path().join("upstream");
        copy_dir_recursive(&fixture_source(), &repo_dir).expect("Failed to copy fixture source");
        git2::Repository::init(&repo_dir).expect("Failed to init repository");
        commit_all(&repo_dir, "init");
        let url = format!("file://{}", repo_dir.display());
        (repo_dir, url)
    }

    /// Write a file in the workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in the workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Binary under test with environment overrides removed
#[allow(deprecated)]
pub fn agentic_cmd() -> Command {
    let mut cmd = Command::cargo_bin("agentic-skills").unwrap();
    // Ignore developer overrides
    cmd.env_remove("AGENTIC_SKILLS_SOURCE");
    cmd.env_remove("AGENTIC_SKILLS_REPO");
    cmd.env("NO_COLOR", "1");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

/// Source tree shipped with the tests
pub fn fixture_source() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("common")
        .join("fixtures")
        .join("source")
}

/// Fixture source as a command-line argument
#[allow(dead_code)]
pub fn fixture_source_arg() -> String {
    fixture_source().display().to_string()
}

/// Parsed manifest at a target root
#[allow(dead_code)]
pub fn read_manifest(base: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(base.join(".agentic-skills.manifest"))
        .expect("Failed to read manifest");
    serde_json::from_str(&text).expect("Manifest is not valid JSON")
}

/// Manifest without its timestamp, for comparing runs
#[allow(dead_code)]
pub fn manifest_without_timestamp(base: &Path) -> serde_json::Value {
    let mut manifest = read_manifest(base);
    if let Some(map) = manifest.as_object_mut() {
        map.remove("installed_at");
    }
    manifest
}

/// Hash of every path, file content and directory below `root`
#[allow(dead_code)]
pub fn hash_dir(root: &Path) -> String {
    let mut hasher = blake3::Hasher::new();
    if !root.exists() {
        return hasher.finalize().to_hex().to_string();
    }
    let mut entries: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .map(walkdir::DirEntry::into_path)
        .collect();
    entries.sort();
    for path in entries {
        let rel = path.strip_prefix(root).unwrap_or(&path);
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        if path.is_file() {
            hasher.update(&std::fs::read(&path).expect("Failed to read file"));
        }
        hasher.update(b"\0");
    }
    hasher.finalize().to_hex().to_string()
}

/// Commit every file in `repo_dir` to `main`
#[allow(dead_code)]
pub fn commit_all(repo_dir: &Path, message: &str) {
    let repo = git2::Repository::open(repo_dir).expect("Failed to open repository");
    let mut index = repo.index().expect("Failed to read index");
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .expect("Failed to stage files");
    index
        .update_all(["*"], None)
        .expect("Failed to stage removals");
    index.write().expect("Failed to write index");
    let tree = repo
        .find_tree(index.write_tree().expect("Failed to write tree"))
        .expect("Failed to find tree");
    let signature = git2::Signature::now("Test", "test@example.com").expect("Failed to sign");
    let parent = repo
        .find_reference("refs/heads/main")
        .ok()
        .and_then(|r| r.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(
        Some("refs/heads/main"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .expect("Failed to commit");
    repo.set_head("refs/heads/main").expect("Failed to set HEAD");
}

/// Recursively copy a directory
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        std::fs::create_dir_all(dst)?;
    }

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
