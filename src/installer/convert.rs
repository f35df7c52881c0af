//! Agent conversion to the OpenCode subagent format
//!
//! OpenCode expects agent files with a `description`, `mode: subagent` and a
//! `tools` map of booleans. Source agents declare Claude-style tool names in a
//! comma-separated `tools` field; those are mapped through a closed table of
//! [`Capability`] values. Tokens outside the table are dropped, and an agent
//! left with no capability gets [`MINIMUM_CAPABILITIES`] so it can still
//! navigate the project. An agent without a header converts like one with an
//! empty header, and its whole file becomes the body.

use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};

use crate::catalog::AgentEntry;
use crate::frontmatter::FrontMatter;

/// Normalized OpenCode tool permission. Declaration order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Read,
    Write,
    Edit,
    Bash,
    Grep,
    Glob,
    List,
    Webfetch,
    Todowrite,
    Todoread,
    Patch,
}

impl Capability {
    pub fn id(self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Edit => "edit",
            Capability::Bash => "bash",
            Capability::Grep => "grep",
            Capability::Glob => "glob",
            Capability::List => "list",
            Capability::Webfetch => "webfetch",
            Capability::Todowrite => "todowrite",
            Capability::Todoread => "todoread",
            Capability::Patch => "patch",
        }
    }
}

/// Source token (normalized) to capability. Anything else maps to nothing.
const CAPABILITY_TABLE: &[(&str, Capability)] = &[
    ("read", Capability::Read),
    ("notebookread", Capability::Read),
    ("write", Capability::Write),
    ("edit", Capability::Edit),
    ("multiedit", Capability::Edit),
    ("notebookedit", Capability::Edit),
    ("bash", Capability::Bash),
    ("grep", Capability::Grep),
    ("glob", Capability::Glob),
    ("ls", Capability::List),
    ("list", Capability::List),
    ("webfetch", Capability::Webfetch),
    ("websearch", Capability::Webfetch),
    ("todowrite", Capability::Todowrite),
    ("todoread", Capability::Todoread),
    ("patch", Capability::Patch),
];

/// Granted when an agent's declared tools map to nothing
pub const MINIMUM_CAPABILITIES: [Capability; 3] =
    [Capability::Read, Capability::Glob, Capability::Grep];

/// Map one source token. Case and surrounding whitespace are ignored.
pub fn map_token(token: &str) -> Option<Capability> {
    let normalized = token.trim().to_ascii_lowercase();
    CAPABILITY_TABLE
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, cap)| *cap)
}

/// Map a declared tool list, applying the minimum-capability fallback.
pub fn map_tools<S: AsRef<str>>(tokens: &[S]) -> BTreeSet<Capability> {
    let mut capabilities: BTreeSet<Capability> =
        tokens.iter().filter_map(|t| map_token(t.as_ref())).collect();
    if capabilities.is_empty() {
        capabilities.extend(MINIMUM_CAPABILITIES);
    }
    capabilities
}

/// Converted OpenCode agent
#[derive(Debug, Clone, PartialEq)]
pub struct OpencodeAgent {
    pub description: String,
    pub tools: BTreeSet<Capability>,
    /// Original body, verbatim
    pub body: String,
}

impl OpencodeAgent {
    /// Render the agent document: front matter in fixed key order, then body.
    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        let mut tools = Mapping::new();
        for cap in &self.tools {
            tools.insert(Value::String(cap.id().to_string()), Value::Bool(true));
        }

        let mut header = Mapping::new();
        header.insert(
            Value::String("description".to_string()),
            Value::String(self.description.clone()),
        );
        header.insert(
            Value::String("mode".to_string()),
            Value::String("subagent".to_string()),
        );
        header.insert(Value::String("tools".to_string()), Value::Mapping(tools));

        let yaml = serde_yaml::to_string(&Value::Mapping(header))?;
        Ok(format!("---\n{}---\n{}", yaml, self.body))
    }
}

/// Convert a source agent to the OpenCode subagent schema.
pub fn convert(agent: &AgentEntry) -> OpencodeAgent {
    let empty = FrontMatter::default();
    let front_matter = agent.front_matter.as_ref().unwrap_or(&empty);

    let description = front_matter
        .get_str("description")
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(
            || format!("Specialized subagent: {}", agent.display_name()),
            str::to_string,
        );

    let tools = map_tools(front_matter.get_list("tools").as_slice());

    OpencodeAgent {
        description,
        tools,
        body: agent.body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn agent(content: &str) -> AgentEntry {
        AgentEntry::from_content(Path::new("/src/agents/reviewer.md"), content.to_string())
            .unwrap()
    }

    #[test]
    fn test_map_token_normalizes() {
        assert_eq!(map_token(" Read "), Some(Capability::Read));
        assert_eq!(map_token("MULTIEDIT"), Some(Capability::Edit));
        assert_eq!(map_token("LS"), Some(Capability::List));
        assert_eq!(map_token("Task"), None);
        assert_eq!(map_token("mcp__github__search"), None);
        assert_eq!(map_token(""), None);
    }

    fn minimum() -> BTreeSet<Capability> {
        MINIMUM_CAPABILITIES.into_iter().collect()
    }

    #[test]
    fn test_unknown_tokens_fall_back_to_minimum() {
        assert_eq!(map_tools(&["Task", "mcp__x"]), minimum());
        assert_eq!(map_tools::<&str>(&[]), minimum());
    }

    #[test]
    fn test_duplicate_tokens_are_idempotent() {
        let caps = map_tools(&["Edit", "MultiEdit", "edit"]);
        assert_eq!(caps.into_iter().collect::<Vec<_>>(), vec![Capability::Edit]);
    }

    #[test]
    fn test_known_tokens_do_not_get_minimum() {
        let caps = map_tools(&["Bash"]);
        assert_eq!(caps.into_iter().collect::<Vec<_>>(), vec![Capability::Bash]);
    }

    #[test]
    fn test_convert_folded_description_and_tools() {
        let converted = convert(&agent(
            "---\nname: reviewer\ndescription: >-\n  Reviews code\n  changes.\ntools: Read, Grep, Task, Bash\nmodel: sonnet\n---\n\nYou review.\n",
        ));

        assert_eq!(converted.description, "Reviews code changes.");
        assert_eq!(
            converted.tools.iter().map(|c| c.id()).collect::<Vec<_>>(),
            vec!["read", "bash", "grep"]
        );
        assert_eq!(converted.body, "\nYou review.\n");
    }

    #[test]
    fn test_convert_synthesizes_description() {
        let converted = convert(&agent("---\nname: reviewer\ndescription: \"\"\n---\nBody\n"));
        assert_eq!(converted.description, "Specialized subagent: reviewer");
        assert_eq!(converted.tools, minimum());
    }

    #[test]
    fn test_convert_without_front_matter_keeps_whole_file() {
        let converted = convert(&agent("# Reviewer\n\nYou review.\n"));
        assert_eq!(converted.description, "Specialized subagent: reviewer");
        assert_eq!(converted.tools, minimum());
        assert_eq!(converted.body, "# Reviewer\n\nYou review.\n");

        let rendered = converted.render().unwrap();
        let (fm, body) = crate::frontmatter::parse_document(&rendered).unwrap();
        assert_eq!(fm.get_str("mode"), Some("subagent"));
        assert_eq!(body, "# Reviewer\n\nYou review.\n");
    }

    #[test]
    fn test_tools_render_in_table_order() {
        let converted = convert(&agent(
            "---\nname: reviewer\ndescription: d\ntools: Patch, TodoRead, WebFetch, LS, Read\n---\n",
        ));
        let rendered = converted.render().unwrap();
        let ids: Vec<&str> = converted.tools.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["read", "list", "webfetch", "todoread", "patch"]);
        assert!(rendered.find("webfetch").unwrap() < rendered.find("patch").unwrap());
    }

    #[test]
    fn test_render_key_order_and_body() {
        let converted = convert(&agent(
            "---\nname: reviewer\ndescription: Reviews: carefully\ntools: Write\n---\n# Body\n",
        ));
        let rendered = converted.render().unwrap();

        let description = rendered.find("description:").unwrap();
        let mode = rendered.find("mode: subagent").unwrap();
        let tools = rendered.find("tools:").unwrap();
        assert!(description < mode && mode < tools);
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("---\n# Body\n"));
        assert!(rendered.contains("write: true"));
        assert!(!rendered.contains("name:"));
        assert!(!rendered.contains("model:"));

        // The rendered header must be valid YAML again
        let (fm, body) = crate::frontmatter::parse_document(&rendered).unwrap();
        assert_eq!(fm.get_str("description"), Some("Reviews: carefully"));
        assert_eq!(body, "# Body\n");
    }
}
