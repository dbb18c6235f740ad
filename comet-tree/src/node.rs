use std::{
    any::Any,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicU16, AtomicU32, Ordering},
    },
};

static NEXT_PROP_ID: AtomicU16 = AtomicU16::new(0);
static NEXT_TYPE_ID: AtomicU32 = AtomicU32::new(0);

/// A typed key under which per-node-type (or per-tree) data can be stored.
///
/// Props are allocated once, typically in a `static`, and handed to
/// [`NodeType::with_prop`] / [`NodeType::prop`] by reference. The value
/// type only has to be shareable; lookup downcasts back to it.
pub struct NodeProp<T> {
    id: u16,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T: Send + Sync + 'static> NodeProp<T> {
    pub fn new() -> Self {
        Self {
            id: NEXT_PROP_ID.fetch_add(1, Ordering::Relaxed),
            _marker: PhantomData,
        }
    }
}

impl<T: Send + Sync + 'static> Default for NodeProp<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Default)]
pub(crate) struct PropMap(Vec<(u16, Arc<dyn Any + Send + Sync>)>);

impl PropMap {
    pub(crate) fn insert<T: Send + Sync + 'static>(
        &mut self,
        prop: &NodeProp<T>,
        value: T,
    ) {
        self.0.retain(|(id, _)| *id != prop.id);
        self.0.push((prop.id, Arc::new(value)));
    }

    pub(crate) fn get<T: Send + Sync + 'static>(
        &self,
        prop: &NodeProp<T>,
    ) -> Option<&T> {
        self.0
            .iter()
            .find(|(id, _)| *id == prop.id)
            .and_then(|(_, value)| value.downcast_ref())
    }
}

/// The type of a syntax-tree node: a name, a top-of-language flag and a
/// bag of props.
///
/// Types compare by identity (the id handed out at [`NodeType::define`]
/// time); [`NodeType::with_prop`] keeps the id, so a configured copy of a
/// type still equals the original.
#[derive(Clone)]
pub struct NodeType(Arc<NodeTypeData>);

struct NodeTypeData {
    id: u32,
    name: String,
    is_top: bool,
    props: PropMap,
}

impl NodeType {
    fn alloc(name: String, is_top: bool) -> Self {
        Self(Arc::new(NodeTypeData {
            id: NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name,
            is_top,
            props: PropMap::default(),
        }))
    }

    pub fn define(name: impl Into<String>) -> Self {
        Self::alloc(name.into(), false)
    }

    /// Defines the root type of a language. The highlighter switches its
    /// style scope whenever it enters a node of a top type.
    pub fn define_top(name: impl Into<String>) -> Self {
        Self::alloc(name.into(), true)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_top(&self) -> bool {
        self.0.is_top
    }

    pub fn prop<T: Send + Sync + 'static>(
        &self,
        prop: &NodeProp<T>,
    ) -> Option<&T> {
        self.0.props.get(prop)
    }

    /// Returns a copy of this type carrying `value` under `prop`. The
    /// copy keeps the identity of the original.
    pub fn with_prop<T: Send + Sync + 'static>(
        &self,
        prop: &NodeProp<T>,
        value: T,
    ) -> Self {
        let mut props = self.0.props.clone();
        props.insert(prop, value);
        Self(Arc::new(NodeTypeData {
            id: self.0.id,
            name: self.0.name.clone(),
            is_top: self.0.is_top,
            props,
        }))
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for NodeType {}

impl std::fmt::Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeType({})", self.0.name)
    }
}

/// The node types of one grammar, in no particular order.
#[derive(Clone, Default)]
pub struct NodeSet {
    types: Vec<NodeType>,
}

impl NodeSet {
    pub fn new(types: Vec<NodeType>) -> Self {
        Self { types }
    }

    pub fn get(&self, name: &str) -> Option<&NodeType> {
        self.types.iter().find(|ty| ty.name() == name)
    }

    pub fn types(&self) -> &[NodeType] {
        &self.types
    }

    /// Rebuilds the set, attaching `prop` to every type for which
    /// `source` produces a value. This is the configuration step a
    /// language runs once, before any tree is built from the set.
    pub fn extend<T, F>(&self, prop: &NodeProp<T>, mut source: F) -> Self
    where
        T: Send + Sync + 'static,
        F: FnMut(&NodeType) -> Option<T>,
    {
        Self {
            types: self
                .types
                .iter()
                .map(|ty| match source(ty) {
                    Some(value) => ty.with_prop(prop, value),
                    None => ty.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use once_cell::sync::Lazy;

    use super::*;

    static MARK: Lazy<NodeProp<u32>> = Lazy::new(NodeProp::new);

    #[test]
    fn test_with_prop_keeps_identity() {
        let ty = NodeType::define("Identifier");
        let configured = ty.with_prop(&MARK, 7);
        assert_eq!(ty, configured);
        assert_eq!(configured.prop(&MARK), Some(&7));
        assert_eq!(ty.prop(&MARK), None);
    }

    #[test]
    fn test_extend_attaches_by_name() {
        let set = NodeSet::new(vec![
            NodeType::define_top("Document"),
            NodeType::define("Identifier"),
        ]);
        let set = set.extend(&MARK, |ty| {
            (ty.name() == "Identifier").then_some(1)
        });
        assert_eq!(set.get("Identifier").unwrap().prop(&MARK), Some(&1));
        assert_eq!(set.get("Document").unwrap().prop(&MARK), None);
        assert!(set.get("Document").unwrap().is_top());
    }
}
