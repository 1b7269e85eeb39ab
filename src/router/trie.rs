//! Trie of URL templates with path-variable capture.
//!
//! Matching is a depth-first descent with backtracking. At every level the
//! literal child for the segment is tried first; only when that subtree
//! fails are the variable children tried, in the order their templates were
//! registered. A variable child binds the segment text under its variable
//! name, and the binding is undone when its subtree fails.
//!
//! Trailing slashes are significant: `/a/b` and `/a/b/` are distinct
//! templates. A path ending in `/` may still match the slash-less template
//! as long as no variable was bound during the descent, so `/xyz/` finds a
//! registered `/xyz`, but `/api/user/123/` does not find
//! `/api/user/{userId}`.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Error raised when a malformed template is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A segment uses braces without forming a `{name}` variable.
    UnbalancedBraces { pattern: String, segment: String },
    /// The same variable name appears twice in one template.
    DuplicateVariable { pattern: String, name: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::UnbalancedBraces { pattern, segment } => {
                write!(
                    f,
                    "invalid endpoint pattern '{pattern}': segment '{segment}' has unbalanced braces"
                )
            }
            PatternError::DuplicateVariable { pattern, name } => {
                write!(
                    f,
                    "invalid endpoint pattern '{pattern}': variable '{name}' appears more than once"
                )
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Successful lookup: the matched template and its variable bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMatch {
    /// The registered template that matched, e.g. `/api/user/{userId}`.
    pub pattern: String,
    /// Captured `name -> segment` bindings, e.g. `{"userId": "123"}`.
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct TrieNode {
    literal_children: HashMap<String, TrieNode>,
    // Vec, not a map: variable siblings are tried in registration order.
    variable_children: Vec<(String, TrieNode)>,
    // Some iff this node terminates a registered template.
    pattern: Option<String>,
}

impl TrieNode {
    fn has_children(&self) -> bool {
        !self.literal_children.is_empty() || !self.variable_children.is_empty()
    }
}

/// Trie of URL templates.
///
/// Built at boot by the dispatcher, then only read. Repeated inserts of the
/// same template are idempotent.
#[derive(Debug, Default)]
pub struct EndpointTrie {
    root: TrieNode,
}

/// Split a path into segments.
///
/// `/a/b` -> `["a", "b"]`; consecutive slashes collapse (`/a//b` ->
/// `["a", "b"]`); a trailing slash is preserved as one empty sentinel
/// segment (`/a/b/` -> `["a", "b", ""]`); `/` and `""` -> `[]`.
fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() || path == "/" {
        return Vec::new();
    }

    let mut rest = path.strip_prefix('/').unwrap_or(path);
    let trailing_slash = rest.ends_with('/');
    if trailing_slash {
        rest = &rest[..rest.len() - 1];
    }

    let mut segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    if trailing_slash {
        segments.push("");
    }
    segments
}

/// A segment is a variable iff it is `{` + name + `}` and at least two
/// characters long.
fn is_variable_segment(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn variable_name(segment: &str) -> &str {
    &segment[1..segment.len() - 1]
}

impl EndpointTrie {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template.
    ///
    /// # Errors
    ///
    /// [`PatternError`] when a segment misuses braces or a variable name
    /// repeats within the template. Startup should treat this as fatal.
    pub fn insert(&mut self, pattern: &str) -> Result<(), PatternError> {
        let segments = split_path(pattern);
        Self::validate(pattern, &segments)?;

        let mut node = &mut self.root;
        for segment in &segments {
            node = if is_variable_segment(segment) {
                let name = variable_name(segment);
                let index = match node
                    .variable_children
                    .iter()
                    .position(|(existing, _)| existing == name)
                {
                    Some(index) => index,
                    None => {
                        node.variable_children
                            .push((name.to_string(), TrieNode::default()));
                        node.variable_children.len() - 1
                    }
                };
                &mut node.variable_children[index].1
            } else {
                node.literal_children
                    .entry((*segment).to_string())
                    .or_default()
            };
        }

        node.pattern = Some(pattern.to_string());
        debug!(pattern = %pattern, "Endpoint pattern registered");
        Ok(())
    }

    fn validate(pattern: &str, segments: &[&str]) -> Result<(), PatternError> {
        let mut seen = Vec::new();
        for segment in segments {
            if segment.is_empty() {
                continue; // trailing-slash sentinel
            }
            if is_variable_segment(segment) {
                let name = variable_name(segment);
                if name.contains('{') || name.contains('}') {
                    return Err(PatternError::UnbalancedBraces {
                        pattern: pattern.to_string(),
                        segment: (*segment).to_string(),
                    });
                }
                if seen.contains(&name) {
                    return Err(PatternError::DuplicateVariable {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                seen.push(name);
            } else if segment.contains('{') || segment.contains('}') {
                return Err(PatternError::UnbalancedBraces {
                    pattern: pattern.to_string(),
                    segment: (*segment).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a concrete request path to the best-matching template.
    ///
    /// Returns `None` when nothing matches. Never fails otherwise.
    #[must_use]
    pub fn search(&self, path: &str) -> Option<EndpointMatch> {
        let segments = split_path(path);
        let mut variables = HashMap::new();
        let pattern = Self::search_node(&self.root, &segments, 0, &mut variables)?;
        debug!(path = %path, pattern = %pattern, "Endpoint match");
        Some(EndpointMatch {
            pattern: pattern.to_string(),
            variables,
        })
    }

    fn search_node<'t>(
        node: &'t TrieNode,
        segments: &[&str],
        index: usize,
        variables: &mut HashMap<String, String>,
    ) -> Option<&'t str> {
        if index >= segments.len() {
            return node.pattern.as_deref();
        }

        let segment = segments[index];

        if segment.is_empty() {
            if index + 1 >= segments.len() {
                // Trailing-slash sentinel. A slash-less template matches
                // here only when no variable was bound on the way down;
                // a template registered with its own trailing slash lives
                // under the empty literal child and matches regardless.
                if node.pattern.is_some() && variables.is_empty() {
                    return node.pattern.as_deref();
                }
                if let Some(child) = node.literal_children.get("") {
                    return Self::search_node(child, segments, index + 1, variables);
                }
                return None;
            }
            // An empty segment away from the end can only bind variables.
            for (name, child) in &node.variable_children {
                variables.insert(name.clone(), String::new());
                if let Some(found) = Self::search_node(child, segments, index + 1, variables) {
                    return Some(found);
                }
                variables.remove(name);
            }
            return None;
        }

        if let Some(child) = node.literal_children.get(segment) {
            if let Some(found) = Self::search_node(child, segments, index + 1, variables) {
                return Some(found);
            }
        }

        for (name, child) in &node.variable_children {
            variables.insert(name.clone(), segment.to_string());
            if let Some(found) = Self::search_node(child, segments, index + 1, variables) {
                return Some(found);
            }
            variables.remove(name);
        }

        None
    }

    /// True when no template has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.pattern.is_none() && !self.root.has_children()
    }

    /// Drop every registered template.
    pub fn clear(&mut self) {
        self.root = TrieNode::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_with(patterns: &[&str]) -> EndpointTrie {
        let mut trie = EndpointTrie::new();
        for pattern in patterns {
            trie.insert(pattern).expect("pattern is well-formed");
        }
        trie
    }

    #[test]
    fn test_exact_literal_match() {
        let trie = trie_with(&["/api/device/status"]);
        let m = trie.search("/api/device/status").unwrap();
        assert_eq!(m.pattern, "/api/device/status");
        assert!(m.variables.is_empty());
    }

    #[test]
    fn test_variable_capture() {
        let trie = trie_with(&["/a/{x}/b"]);
        let m = trie.search("/a/v/b").unwrap();
        assert_eq!(m.pattern, "/a/{x}/b");
        assert_eq!(m.variables["x"], "v");

        assert!(trie.search("/a/v/c").is_none());
    }

    #[test]
    fn test_multiple_variables() {
        let trie = trie_with(&["/hello/{a}/{b}/{c}"]);
        let m = trie.search("/hello/x/y/z").unwrap();
        assert_eq!(m.variables["a"], "x");
        assert_eq!(m.variables["b"], "y");
        assert_eq!(m.variables["c"], "z");
    }

    #[test]
    fn test_literal_dominates_variable() {
        let trie = trie_with(&["/a/{x}", "/a/b"]);
        let m = trie.search("/a/b").unwrap();
        assert_eq!(m.pattern, "/a/b");
        assert!(m.variables.is_empty());

        let m = trie.search("/a/c").unwrap();
        assert_eq!(m.pattern, "/a/{x}");
        assert_eq!(m.variables["x"], "c");
    }

    #[test]
    fn test_variable_siblings_use_insertion_order() {
        let trie = trie_with(&["/p/{first}", "/p/{second}"]);
        let m = trie.search("/p/z").unwrap();
        assert_eq!(m.pattern, "/p/{first}");
        assert_eq!(m.variables.len(), 1);
    }

    #[test]
    fn test_backtracking_across_variable_siblings() {
        let trie = trie_with(&["/r/{a}/posts", "/r/{b}/comments"]);

        let m = trie.search("/r/7/comments").unwrap();
        assert_eq!(m.pattern, "/r/{b}/comments");
        assert_eq!(m.variables.get("b").map(String::as_str), Some("7"));
        assert!(!m.variables.contains_key("a"));
    }

    #[test]
    fn test_backtracking_from_literal_into_variable() {
        // The literal branch consumes "b" but dead-ends; the variable
        // branch must then be retried for the same segment.
        let trie = trie_with(&["/a/b/end", "/a/{x}/other"]);
        let m = trie.search("/a/b/other").unwrap();
        assert_eq!(m.pattern, "/a/{x}/other");
        assert_eq!(m.variables["x"], "b");
    }

    #[test]
    fn test_trailing_slash_matches_slashless_literal() {
        let trie = trie_with(&["/xyz"]);
        let m = trie.search("/xyz/").unwrap();
        assert_eq!(m.pattern, "/xyz");
    }

    #[test]
    fn test_trailing_slash_rejected_after_variable_binding() {
        let trie = trie_with(&["/api/user/{userId}"]);
        assert!(trie.search("/api/user/123").is_some());
        assert!(trie.search("/api/user/123/").is_none());
    }

    #[test]
    fn test_trailing_slash_template_matches_itself() {
        let trie = trie_with(&["/xyz/"]);
        let m = trie.search("/xyz/").unwrap();
        assert_eq!(m.pattern, "/xyz/");
        assert!(trie.search("/xyz").is_none());
    }

    #[test]
    fn test_slash_and_slashless_templates_coexist() {
        let trie = trie_with(&["/xyz", "/xyz/"]);
        assert_eq!(trie.search("/xyz").unwrap().pattern, "/xyz");
        // The no-captures rule wins before descending into the
        // trailing-slash child.
        assert_eq!(trie.search("/xyz/").unwrap().pattern, "/xyz");
    }

    #[test]
    fn test_consecutive_slashes_collapse() {
        let trie = trie_with(&["/a/b"]);
        assert_eq!(trie.search("/a//b").unwrap().pattern, "/a/b");
    }

    #[test]
    fn test_root_path() {
        let trie = trie_with(&["/"]);
        assert_eq!(trie.search("/").unwrap().pattern, "/");
        assert!(trie.search("/a").is_none());
    }

    #[test]
    fn test_no_match_on_extra_or_missing_segments() {
        let trie = trie_with(&["/a/b"]);
        assert!(trie.search("/a").is_none());
        assert!(trie.search("/a/b/c").is_none());
        assert!(trie.search("/unknown/path").is_none());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut trie = EndpointTrie::new();
        trie.insert("/api/user/{userId}").unwrap();
        trie.insert("/api/user/{userId}").unwrap();
        let m = trie.search("/api/user/5").unwrap();
        assert_eq!(m.pattern, "/api/user/{userId}");
    }

    #[test]
    fn test_insert_rejects_unbalanced_braces() {
        let mut trie = EndpointTrie::new();
        assert!(matches!(
            trie.insert("/api/{userId"),
            Err(PatternError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            trie.insert("/api/userId}"),
            Err(PatternError::UnbalancedBraces { .. })
        ));
        assert!(matches!(
            trie.insert("/api/{a{b}}"),
            Err(PatternError::UnbalancedBraces { .. })
        ));
    }

    #[test]
    fn test_insert_rejects_duplicate_variable_names() {
        let mut trie = EndpointTrie::new();
        assert!(matches!(
            trie.insert("/api/{id}/sub/{id}"),
            Err(PatternError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn test_is_empty_and_clear() {
        let mut trie = EndpointTrie::new();
        assert!(trie.is_empty());
        trie.insert("/a").unwrap();
        assert!(!trie.is_empty());
        trie.clear();
        assert!(trie.is_empty());
        assert!(trie.search("/a").is_none());
    }

    #[test]
    fn test_split_path_shapes() {
        assert_eq!(split_path("/a/b"), vec!["a", "b"]);
        assert_eq!(split_path("/a/b/"), vec!["a", "b", ""]);
        assert_eq!(split_path("/a//b"), vec!["a", "b"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }
}
