use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use itertools::Itertools;
use once_cell::sync::OnceCell;

use crate::HighlightError;

static NEXT_TAG_ID: AtomicUsize = AtomicUsize::new(0);
static NEXT_MODIFIER_ID: AtomicUsize = AtomicUsize::new(0);

/// A highlighting category.
///
/// Tags are cheap-clone handles with process lifetime; equality is
/// identity. A tag carries its whole fallback chain in [`Tag::set`]: the
/// tag itself first, then ever more general ancestors, so that a style
/// can resolve a specific tag against whichever ancestor it has an entry
/// for.
#[derive(Clone)]
pub struct Tag(Arc<TagData>);

struct TagData {
    id: usize,
    base: Option<Tag>,
    modified: Vec<Modifier>,
    // Written exactly once, right after allocation. The first entry is
    // the tag itself, which makes the chain self-owning; tags are never
    // freed, so the cycle is intentional.
    set: OnceCell<Vec<Tag>>,
}

impl Tag {
    fn alloc(base: Option<Tag>, modified: Vec<Modifier>) -> Tag {
        Tag(Arc::new(TagData {
            id: NEXT_TAG_ID.fetch_add(1, Ordering::Relaxed),
            base,
            modified,
            set: OnceCell::new(),
        }))
    }

    fn init_set(&self, set: Vec<Tag>) {
        let _ = self.0.set.set(set);
    }

    /// Defines a new tag, optionally as a child of `parent`.
    ///
    /// Fails with [`HighlightError::InvalidParent`] when the parent is a
    /// modified tag; only unmodified tags can be derived from.
    pub fn define(parent: Option<&Tag>) -> Result<Tag, HighlightError> {
        if let Some(parent) = parent {
            if parent.0.base.is_some() {
                return Err(HighlightError::InvalidParent);
            }
        }
        let tag = Tag::alloc(None, Vec::new());
        let mut set = vec![tag.clone()];
        if let Some(parent) = parent {
            set.extend(parent.set().iter().cloned());
        }
        tag.init_set(set);
        Ok(tag)
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    /// This tag followed by its ancestors, most specific first.
    pub fn set(&self) -> &[Tag] {
        self.0
            .set
            .get()
            .expect("tag set is initialised on construction")
    }

    /// The unmodified tag this one was derived from, if any.
    pub fn base(&self) -> Option<&Tag> {
        self.0.base.as_ref()
    }

    /// The modifiers applied to [`Tag::base`], in ascending id order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.0.modified
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.base {
            Some(base) => {
                write!(f, "Tag({}*{})", base.0.id, self.0.modified.len())
            }
            None => write!(f, "Tag({})", self.0.id),
        }
    }
}

/// An orthogonal attribute that can be applied to any unmodified tag (or
/// to an already modified one, accumulating).
///
/// Application is idempotent and commutative: every `(base, modifier
/// set)` pair is interned to a single canonical [`Tag`].
#[derive(Clone)]
pub struct Modifier(Arc<ModifierData>);

struct ModifierData {
    id: usize,
    instances: Mutex<Vec<Tag>>,
}

impl Modifier {
    pub fn define() -> Modifier {
        Modifier(Arc::new(ModifierData {
            id: NEXT_MODIFIER_ID.fetch_add(1, Ordering::Relaxed),
            instances: Mutex::new(Vec::new()),
        }))
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    /// Returns the canonical tag for `tag` with this modifier added.
    pub fn apply(&self, tag: &Tag) -> Tag {
        let base = match &tag.0.base {
            Some(base) => base.clone(),
            None => tag.clone(),
        };
        let mut mods = tag.0.modified.clone();
        match mods.binary_search_by_key(&self.0.id, |m| m.0.id) {
            Ok(_) => {}
            Err(at) => mods.insert(at, self.clone()),
        }
        Modifier::get(&base, &mods)
    }

    /// The canonical tag for `base` under the modifier set `mods`
    /// (ascending id order). Interns on first use.
    fn get(base: &Tag, mods: &[Modifier]) -> Tag {
        if mods.is_empty() {
            return base.clone();
        }
        if let Some(tag) = Modifier::find(base, mods) {
            return tag;
        }

        // Fallback chain: every non-empty subset of the modifiers applied
        // to every ancestor, larger subsets (more specific tags) first,
        // ancestors in base.set order within a subset size, ending at the
        // plain base. The first entry, the full set applied to the base
        // itself, is the tag being built; no other entry resolves to it,
        // so the whole chain completes before the tag becomes visible.
        let tag = Tag::alloc(Some(base.clone()), mods.to_vec());
        let subsets = mods
            .iter()
            .cloned()
            .powerset()
            .filter(|subset| !subset.is_empty())
            .sorted_by(|a, b| b.len().cmp(&a.len()))
            .collect::<Vec<_>>();
        let mut set = Vec::with_capacity(subsets.len() * base.set().len() + 1);
        for (i, subset) in subsets.iter().enumerate() {
            for (j, ancestor) in base.set().iter().enumerate() {
                if i == 0 && j == 0 {
                    set.push(tag.clone());
                } else {
                    set.push(Modifier::get(ancestor, subset));
                }
            }
        }
        set.push(base.clone());
        tag.init_set(set);

        // Register under the first modifier's table, which is the intern
        // point for the whole canonically-ordered set. A racing thread
        // may have built the same tag in the meantime; its copy wins.
        let mut instances = mods[0]
            .0
            .instances
            .lock()
            .expect("modifier instance table poisoned");
        if let Some(existing) = Modifier::find_in(&instances, base, mods) {
            return existing;
        }
        instances.push(tag.clone());
        drop(instances);
        for modifier in &mods[1..] {
            modifier
                .0
                .instances
                .lock()
                .expect("modifier instance table poisoned")
                .push(tag.clone());
        }
        tag
    }

    fn find(base: &Tag, mods: &[Modifier]) -> Option<Tag> {
        let instances = mods[0]
            .0
            .instances
            .lock()
            .expect("modifier instance table poisoned");
        Modifier::find_in(&instances, base, mods)
    }

    fn find_in(instances: &[Tag], base: &Tag, mods: &[Modifier]) -> Option<Tag> {
        instances
            .iter()
            .find(|tag| {
                tag.0.base.as_ref() == Some(base)
                    && tag
                        .0
                        .modified
                        .iter()
                        .map(Modifier::id)
                        .eq(mods.iter().map(Modifier::id))
            })
            .cloned()
    }
}

impl PartialEq for Modifier {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Modifier {}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifier({})", self.0.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_extends_parent_set() {
        let parent = Tag::define(None).unwrap();
        let child = Tag::define(Some(&parent)).unwrap();
        assert_eq!(child.set().len(), 2);
        assert_eq!(&child.set()[0], &child);
        assert_eq!(&child.set()[1..], parent.set());
    }

    #[test]
    fn test_modified_parent_rejected() {
        let base = Tag::define(None).unwrap();
        let modified = Modifier::define().apply(&base);
        assert_eq!(
            Tag::define(Some(&modified)),
            Err(HighlightError::InvalidParent)
        );
        assert!(Tag::define(Some(&base)).is_ok());
    }

    #[test]
    fn test_idempotent() {
        let tag = Tag::define(None).unwrap();
        let m = Modifier::define();
        assert_eq!(m.apply(&tag), m.apply(&m.apply(&tag)));
    }

    #[test]
    fn test_commutative() {
        let tag = Tag::define(None).unwrap();
        let m1 = Modifier::define();
        let m2 = Modifier::define();
        assert_eq!(m1.apply(&m2.apply(&tag)), m2.apply(&m1.apply(&tag)));
    }

    #[test]
    fn test_modified_set_shape() {
        let root = Tag::define(None).unwrap();
        let base = Tag::define(Some(&root)).unwrap();
        let m1 = Modifier::define();
        let m2 = Modifier::define();
        let tag = m1.apply(&m2.apply(&base));

        // k ancestors in base.set, n modifiers: k * (2^n - 1) + 1.
        let set = tag.set();
        assert_eq!(set.len(), 2 * 3 + 1);
        // Self first, then the full modifier set on each ancestor, then
        // single modifiers, then the plain base last.
        assert_eq!(&set[0], &tag);
        assert_eq!(set[1], m1.apply(&m2.apply(&root)));
        assert_eq!(set[2], m1.apply(&base));
        assert_eq!(set[3], m1.apply(&root));
        assert_eq!(set[4], m2.apply(&base));
        assert_eq!(set[5], m2.apply(&root));
        assert_eq!(&set[6], &base);
    }

    #[test]
    fn test_modified_tags_are_interned() {
        let base = Tag::define(None).unwrap();
        let m = Modifier::define();
        let a = m.apply(&base);
        let b = m.apply(&base);
        assert_eq!(a.id(), b.id());
        assert_eq!(a.base(), Some(&base));
        assert_eq!(a.modifiers().len(), 1);
    }
}
