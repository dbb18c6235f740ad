//! Highlight styles: the mapping from abstract [`Tag`]s to class
//! strings, with ancestor fallback, scoping to a single language, and
//! combination of several styles into one matcher.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use arc_swap::ArcSwap;
use comet_tree::NodeType;
use once_cell::sync::Lazy;

use crate::{tag::Tag, tags};

/// Resolves a tag to a class string, given the top node type of the
/// language currently being highlighted. Implemented by
/// [`HighlightStyle`] and [`CombinedMatcher`].
pub trait TagMatcher {
    fn style(&self, tag: &Tag, scope: &NodeType) -> Option<Arc<str>>;
}

/// One entry of a style definition: a set of tags and either the class
/// to assign or the raw CSS properties a class should be generated for.
#[derive(Clone, Debug)]
pub struct TagStyle {
    pub tags: Vec<Tag>,
    /// Explicit class name. Filled with a synthesized name after
    /// [`HighlightStyle::define`] when the entry only carries
    /// `properties`.
    pub class: Option<String>,
    /// Raw CSS properties. The engine only generates the class name;
    /// emitting the actual CSS is the embedder's concern, via
    /// [`HighlightStyle::specs`].
    pub properties: Vec<(String, String)>,
}

impl TagStyle {
    pub fn class(tags: Vec<Tag>, class: impl Into<String>) -> Self {
        Self {
            tags,
            class: Some(class.into()),
            properties: Vec::new(),
        }
    }

    pub fn properties(
        tags: Vec<Tag>,
        properties: Vec<(String, String)>,
    ) -> Self {
        Self {
            tags,
            class: None,
            properties,
        }
    }
}

/// Options for [`HighlightStyle::define`].
#[derive(Clone, Default)]
pub struct StyleOptions {
    /// Restricts the style to one language: when set, the style only
    /// matches while the highlighter's scope is this (top) node type.
    pub scope: Option<NodeType>,
    /// A class added to every token the style assigns a class to, and
    /// returned for styled-but-unmatched tags.
    pub all: Option<String>,
}

static NEXT_CLASS_ID: AtomicUsize = AtomicUsize::new(1);

/// A compiled style: tag-id to class with memoized ancestor fallback.
///
/// The cache is monotonic; a lost race between two threads writes the
/// same value twice, so it is kept in an [`ArcSwap`] and updated with
/// copy-on-write.
pub struct HighlightStyle {
    specs: Vec<TagStyle>,
    map: ArcSwap<HashMap<usize, Option<Arc<str>>>>,
    scope: Option<NodeType>,
    all: Option<Arc<str>>,
}

impl HighlightStyle {
    /// Builds a style from a list of tag/class entries. Entries without
    /// a class get a synthesized, process-unique name.
    pub fn define(specs: Vec<TagStyle>, options: StyleOptions) -> Self {
        let all: Option<Arc<str>> =
            options.all.as_deref().map(Arc::from);
        let mut specs = specs;
        let mut map = HashMap::new();
        for spec in &mut specs {
            let class = match &spec.class {
                Some(class) => class.clone(),
                None => {
                    let class = format!(
                        "hl{}",
                        NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed)
                    );
                    spec.class = Some(class.clone());
                    class
                }
            };
            let class: Arc<str> = match &all {
                Some(all) => format!("{class} {all}").into(),
                None => class.into(),
            };
            for tag in &spec.tags {
                map.insert(tag.id(), Some(class.clone()));
            }
        }
        Self {
            specs,
            map: ArcSwap::from_pointee(map),
            scope: options.scope,
            all,
        }
    }

    /// The entries this style was defined with, classes resolved. An
    /// embedder that wants actual CSS walks these and emits a rule per
    /// entry.
    pub fn specs(&self) -> &[TagStyle] {
        &self.specs
    }

    pub fn scope(&self) -> Option<&NodeType> {
        self.scope.as_ref()
    }

    fn memoize(&self, id: usize, class: Option<Arc<str>>) {
        self.map.rcu(|map| {
            let mut map = (**map).clone();
            map.insert(id, class.clone());
            map
        });
    }

    /// Combines several styles into a single matcher that concatenates
    /// every non-null class, in style order. The combined result is
    /// cached per tag id unless one of the styles is scoped (scope is
    /// then part of the key and rarely repeats).
    pub fn combined_match(styles: Vec<Arc<HighlightStyle>>) -> CombinedMatcher {
        let cache = styles
            .iter()
            .all(|style| style.scope.is_none())
            .then(|| ArcSwap::from_pointee(HashMap::new()));
        CombinedMatcher { styles, cache }
    }
}

impl TagMatcher for HighlightStyle {
    fn style(&self, tag: &Tag, scope: &NodeType) -> Option<Arc<str>> {
        if let Some(own) = &self.scope {
            if own != scope {
                return None;
            }
        }
        let map = self.map.load();
        for ancestor in tag.set() {
            if let Some(class) = map.get(&ancestor.id()) {
                let class = class.clone();
                if ancestor != tag {
                    self.memoize(tag.id(), class.clone());
                }
                return class;
            }
        }
        let class = self.all.clone();
        self.memoize(tag.id(), class.clone());
        class
    }
}

/// The matcher returned by [`HighlightStyle::combined_match`].
pub struct CombinedMatcher {
    styles: Vec<Arc<HighlightStyle>>,
    cache: Option<ArcSwap<HashMap<usize, Option<Arc<str>>>>>,
}

impl TagMatcher for CombinedMatcher {
    fn style(&self, tag: &Tag, scope: &NodeType) -> Option<Arc<str>> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.load().get(&tag.id()) {
                return hit.clone();
            }
        }
        let mut result: Option<String> = None;
        for style in &self.styles {
            if let Some(class) = style.style(tag, scope) {
                match &mut result {
                    Some(joined) => {
                        joined.push(' ');
                        joined.push_str(&class);
                    }
                    None => result = Some(class.to_string()),
                }
            }
        }
        let result: Option<Arc<str>> = result.map(Arc::from);
        if let Some(cache) = &self.cache {
            cache.rcu(|map| {
                let mut map = (**map).clone();
                map.insert(tag.id(), result.clone());
                map
            });
        }
        result
    }
}

/// A style assigning a stable, readable `cmt-` class to every standard
/// tag, for embedders that ship their own CSS.
pub static CLASS_HIGHLIGHT_STYLE: Lazy<HighlightStyle> = Lazy::new(|| {
    let entries = [
        (vec![tags::LINK.clone()], "cmt-link"),
        (vec![tags::HEADING.clone()], "cmt-heading"),
        (vec![tags::EMPHASIS.clone()], "cmt-emphasis"),
        (vec![tags::STRONG.clone()], "cmt-strong"),
        (vec![tags::KEYWORD.clone()], "cmt-keyword"),
        (vec![tags::ATOM.clone()], "cmt-atom"),
        (vec![tags::BOOL.clone()], "cmt-bool"),
        (vec![tags::URL.clone()], "cmt-url"),
        (vec![tags::LABEL_NAME.clone()], "cmt-labelName"),
        (vec![tags::INSERTED.clone()], "cmt-inserted"),
        (vec![tags::DELETED.clone()], "cmt-deleted"),
        (vec![tags::LITERAL.clone()], "cmt-literal"),
        (vec![tags::STRING.clone()], "cmt-string"),
        (vec![tags::NUMBER.clone()], "cmt-number"),
        (
            vec![
                tags::REGEXP.clone(),
                tags::ESCAPE.clone(),
                tags::special(&tags::STRING),
            ],
            "cmt-string2",
        ),
        (vec![tags::VARIABLE_NAME.clone()], "cmt-variableName"),
        (
            vec![tags::local(&tags::VARIABLE_NAME)],
            "cmt-variableName cmt-local",
        ),
        (
            vec![tags::definition(&tags::VARIABLE_NAME)],
            "cmt-variableName cmt-definition",
        ),
        (
            vec![tags::special(&tags::VARIABLE_NAME)],
            "cmt-variableName2",
        ),
        (
            vec![tags::definition(&tags::PROPERTY_NAME)],
            "cmt-propertyName cmt-definition",
        ),
        (vec![tags::TYPE_NAME.clone()], "cmt-typeName"),
        (vec![tags::NAMESPACE.clone()], "cmt-namespace"),
        (vec![tags::CLASS_NAME.clone()], "cmt-className"),
        (vec![tags::MACRO_NAME.clone()], "cmt-macroName"),
        (vec![tags::PROPERTY_NAME.clone()], "cmt-propertyName"),
        (vec![tags::OPERATOR.clone()], "cmt-operator"),
        (vec![tags::COMMENT.clone()], "cmt-comment"),
        (vec![tags::META.clone()], "cmt-meta"),
        (vec![tags::INVALID.clone()], "cmt-invalid"),
        (vec![tags::PUNCTUATION.clone()], "cmt-punctuation"),
    ];
    HighlightStyle::define(
        entries
            .into_iter()
            .map(|(tags, class)| TagStyle::class(tags, class))
            .collect(),
        StyleOptions::default(),
    )
});
