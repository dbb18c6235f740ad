//! The selector compiler: turns path selectors like `Map/Key/Identifier`
//! into per-node-name rule chains that the highlighter matches against
//! its ancestor stack.

use std::collections::HashMap;

use comet_tree::{NodeProp, NodeSet};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{HighlightError, tag::Tag};

/// The node prop under which a type's compiled rule chain is filed.
pub static HIGHLIGHT_RULES: Lazy<NodeProp<Rule>> = Lazy::new(NodeProp::new);

/// How a rule's classes apply to the tree below the matched node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Style this node only.
    Normal,
    /// Style this node and add the classes to every descendant.
    Inherit,
    /// Style this node and suppress all deeper styling.
    Opaque,
}

/// A compiled selector path, filed under its innermost node name.
///
/// Rules for the same name chain through `next` in decreasing context
/// depth, so the most specific alternative is tried first; on equal
/// depth the later-compiled rule comes first.
#[derive(Clone, Debug)]
pub struct Rule {
    pub tags: Vec<Tag>,
    pub mode: Mode,
    /// Required ancestor names, nearest parent first; `None` entries
    /// match any name.
    pub context: Vec<Option<String>>,
    next: Option<Box<Rule>>,
}

impl Rule {
    pub fn depth(&self) -> usize {
        self.context.len()
    }

    pub fn next(&self) -> Option<&Rule> {
        self.next.as_deref()
    }

    /// Inserts `self` into the chain `other`, keeping it sorted by
    /// decreasing depth. Equal depths put the newcomer first.
    fn sort(mut self: Box<Self>, other: Option<Box<Rule>>) -> Box<Rule> {
        match other {
            Some(mut other) if other.depth() > self.depth() => {
                other.next = Some(self.sort(other.next.take()));
                other
            }
            other => {
                self.next = other;
                self
            }
        }
    }

    /// Whether this rule's context accepts the ancestor names in `stack`
    /// for a node at `depth`. The root's own name is out of reach: a
    /// context of length `L` needs `L <= depth - 1`.
    pub fn match_context(&self, stack: &[&str], depth: usize) -> bool {
        if self.context.len() + 1 > depth {
            return false;
        }
        self.context.iter().enumerate().all(|(i, step)| match step {
            Some(name) => stack[depth - 1 - i] == name.as_str(),
            None => true,
        })
    }
}

/// The compiled form of a selector table, keyed by innermost node name.
/// [`Highlighting::extend`] attaches it to a language's node set.
pub struct Highlighting {
    rules: HashMap<String, Rule>,
}

impl Highlighting {
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// The language-configuration step: returns a copy of `set` whose
    /// types carry their rule chain under [`HIGHLIGHT_RULES`].
    pub fn extend(&self, set: &NodeSet) -> NodeSet {
        for name in self.rules.keys() {
            if set.get(name).is_none() {
                debug!("no node type matches highlight selector {name}");
            }
        }
        set.extend(&HIGHLIGHT_RULES, |ty| self.rules.get(ty.name()).cloned())
    }
}

// A step is either a quoted JSON string or a run free of `/` and `!`.
static STEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:"(?:[^"\\]|\\.)*"|[^/!]+)"#).unwrap()
});

/// Compiles a selector table into per-name rule chains.
///
/// Each entry maps a selector (one or more space-separated paths) to the
/// tags its rule applies. Within a path, steps are separated by `/`, `*`
/// matches any name, quoted steps are decoded as JSON strings, a
/// trailing `/...` marks [`Mode::Inherit`] and a trailing `!` marks
/// [`Mode::Opaque`].
pub fn style_tags<'s, E>(entries: E) -> Result<Highlighting, HighlightError>
where
    E: IntoIterator<Item = (&'s str, Vec<Tag>)>,
{
    let mut rules: HashMap<String, Rule> = HashMap::new();
    for (selector, tags) in entries {
        for path in selector.split_ascii_whitespace() {
            let (mut pieces, mode) = parse_path(path)?;
            let inner = match pieces.pop() {
                Some(Some(name)) if !name.is_empty() => name,
                // A wildcard or empty innermost step has nothing to file
                // the rule under.
                _ => return Err(invalid(path)),
            };
            pieces.reverse();
            let rule = Box::new(Rule {
                tags: tags.clone(),
                mode,
                context: pieces,
                next: None,
            });
            let prev = rules.remove(&inner).map(Box::new);
            rules.insert(inner, *rule.sort(prev));
        }
    }
    Ok(Highlighting { rules })
}

fn invalid(path: &str) -> HighlightError {
    HighlightError::InvalidPath(path.to_string())
}

fn parse_path(
    path: &str,
) -> Result<(Vec<Option<String>>, Mode), HighlightError> {
    let mut pieces = Vec::new();
    let mut mode = Mode::Normal;
    let mut pos = 0;
    loop {
        let rest = &path[pos..];
        if rest == "..." && pos > 0 {
            mode = Mode::Inherit;
            break;
        }
        let step = STEP.find(rest).ok_or_else(|| invalid(path))?.as_str();
        pieces.push(if step == "*" {
            None
        } else if step.starts_with('"') {
            Some(
                serde_json::from_str::<String>(step)
                    .map_err(|_| invalid(path))?,
            )
        } else {
            Some(step.to_string())
        });
        pos += step.len();
        if pos == path.len() {
            break;
        }
        let sep = path.as_bytes()[pos];
        pos += 1;
        if pos == path.len() && sep == b'!' {
            mode = Mode::Opaque;
            break;
        }
        if sep != b'/' {
            return Err(invalid(path));
        }
    }
    Ok((pieces, mode))
}

#[cfg(test)]
mod tests {
    use crate::tags;

    use super::*;

    fn one(selector: &str, inner: &str) -> Rule {
        let highlighting =
            style_tags([(selector, vec![tags::KEYWORD.clone()])]).unwrap();
        highlighting.rule(inner).unwrap().clone()
    }

    #[test]
    fn test_plain_path() {
        let rule = one("Identifier", "Identifier");
        assert_eq!(rule.mode, Mode::Normal);
        assert!(rule.context.is_empty());
    }

    #[test]
    fn test_context_is_nearest_parent_first() {
        let rule = one("Map/Key/Identifier", "Identifier");
        assert_eq!(rule.context, vec![
            Some("Key".to_string()),
            Some("Map".to_string())
        ]);
    }

    #[test]
    fn test_wildcard_and_modes() {
        let rule = one("List/*/Name", "Name");
        assert_eq!(rule.context, vec![None, Some("List".to_string())]);
        assert_eq!(one("Array!", "Array").mode, Mode::Opaque);
        assert_eq!(one("Tag/...", "Tag").mode, Mode::Inherit);
    }

    #[test]
    fn test_quoted_step() {
        let highlighting = style_tags([(
            r#""in/valid"/Child"#,
            vec![tags::KEYWORD.clone()],
        )])
        .unwrap();
        let rule = highlighting.rule("Child").unwrap();
        assert_eq!(rule.context, vec![Some("in/valid".to_string())]);

        let highlighting =
            style_tags([(r#""\"x\"""#, vec![tags::KEYWORD.clone()])])
                .unwrap();
        assert!(highlighting.rule("\"x\"").is_some());
    }

    #[test]
    fn test_multiple_paths_per_selector() {
        let highlighting =
            style_tags([("( )", vec![tags::PUNCTUATION.clone()])]).unwrap();
        assert!(highlighting.rule("(").is_some());
        assert!(highlighting.rule(")").is_some());
    }

    #[test]
    fn test_invalid_paths() {
        for path in ["*", "Foo/", "Foo/*", "Foo!Bar", "\"unterminated"] {
            assert_eq!(
                style_tags([(path, vec![tags::KEYWORD.clone()])]).err(),
                Some(HighlightError::InvalidPath(path.to_string())),
                "path {path:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_chain_sorted_by_depth() {
        let highlighting = style_tags([
            ("Identifier", vec![tags::VARIABLE_NAME.clone()]),
            ("Key/Identifier", vec![tags::PROPERTY_NAME.clone()]),
        ])
        .unwrap();
        let rule = highlighting.rule("Identifier").unwrap();
        assert_eq!(rule.depth(), 1);
        assert_eq!(rule.next().unwrap().depth(), 0);
        assert!(rule.next().unwrap().next().is_none());
    }

    #[test]
    fn test_equal_depth_newer_first() {
        let highlighting = style_tags([
            ("Name", vec![tags::VARIABLE_NAME.clone()]),
            ("Name", vec![tags::TYPE_NAME.clone()]),
        ])
        .unwrap();
        let rule = highlighting.rule("Name").unwrap();
        assert_eq!(rule.tags, vec![tags::TYPE_NAME.clone()]);
        assert_eq!(rule.next().unwrap().tags, vec![
            tags::VARIABLE_NAME.clone()
        ]);
    }

    #[test]
    fn test_match_context() {
        let rule = one("Map/Key/Identifier", "Identifier");
        let stack = ["Document", "Map", "Key", "Identifier"];
        assert!(rule.match_context(&stack, 3));
        // Not enough ancestors above the node.
        assert!(!rule.match_context(&stack, 2));
        let wrong = ["Document", "List", "Key", "Identifier"];
        assert!(!rule.match_context(&wrong, 3));
        let wild = one("Map/*/Identifier", "Identifier");
        assert!(wild.match_context(&stack, 3));
        assert!(wild.match_context(
            &["Document", "Map", "Other", "Identifier"],
            3
        ));
        assert!(!wild.match_context(&wrong, 3));
    }

    #[test]
    fn test_root_not_addressable_from_context() {
        let rule = one("Document/List", "List");
        // The node sits at depth 1, directly under the root, which a
        // context can never reach.
        assert!(!rule.match_context(&["Document", "List"], 1));
    }
}
