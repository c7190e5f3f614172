//! Segment tree node.
//!
//! Each node owns one path segment. Children are split by kind so matching can
//! try them in priority order: literal, then capture, then wildcard.

use http::Method;

use crate::method_router::MethodRouter;
use crate::params::Params;
use crate::pattern::Segment;

/// Why an insertion was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InsertConflict {
    /// The method is already registered at this exact path.
    Duplicate(Method),
    /// Another capture name already occupies this position.
    Capture { existing: String, new: String },
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    /// Literal text for static nodes, used as the binary search key.
    segment: String,
    kind: Segment,
    methods: Option<MethodRouter<T>>,
    /// Sorted by `segment`.
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(kind: Segment) -> Self {
        Self {
            segment: match &kind {
                Segment::Static(text) => text.clone(),
                Segment::Param(_) | Segment::Wildcard(_) => String::new(),
            },
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new(Segment::Static(String::new()))
    }

    /// Inserts a method table under the given concrete segments.
    pub(crate) fn insert(
        &mut self,
        segments: &[Segment],
        methods: MethodRouter<T>,
    ) -> Result<(), InsertConflict> {
        let Some((first, rest)) = segments.split_first() else {
            return match &mut self.methods {
                Some(existing) => existing.merge(methods).map_err(InsertConflict::Duplicate),
                None => {
                    self.methods = Some(methods);
                    Ok(())
                }
            };
        };

        match first {
            Segment::Static(text) => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(text))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Node::new(first.clone()));
                        index
                    }
                };
                self.static_children[index].insert(rest, methods)
            }
            Segment::Param(name) => {
                let child = Self::capture_child(&mut self.param_child, first, name)?;
                child.insert(rest, methods)
            }
            Segment::Wildcard(name) => {
                let child = Self::capture_child(&mut self.wildcard_child, first, name)?;
                child.insert(rest, methods)
            }
        }
    }

    fn capture_child<'a>(
        slot: &'a mut Option<Box<Node<T>>>,
        kind: &Segment,
        name: &str,
    ) -> Result<&'a mut Node<T>, InsertConflict> {
        let child = slot.get_or_insert_with(|| Box::new(Node::new(kind.clone())));
        if let Segment::Param(existing) | Segment::Wildcard(existing) = &child.kind {
            if existing != name {
                return Err(InsertConflict::Capture {
                    existing: existing.clone(),
                    new: name.to_string(),
                });
            }
        }
        Ok(&mut **child)
    }

    /// Finds the first method table for `segments` that `accept` takes,
    /// pushing captures into `params`.
    ///
    /// A table `accept` rejects counts as a miss, so the search backtracks to
    /// lower-priority branches. On failure `params` is left exactly as it was
    /// passed in.
    pub(crate) fn lookup<'a, F>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
        accept: &mut F,
    ) -> Option<&'a MethodRouter<T>>
    where
        F: FnMut(&'a MethodRouter<T>) -> bool,
    {
        let Some((&segment, rest)) = segments.split_first() else {
            return match &self.methods {
                Some(methods) if accept(methods) => Some(methods),
                _ => None,
            };
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.lookup(rest, params, accept) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let Segment::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.as_str(), segment);
                if let Some(found) = child.lookup(rest, params, accept) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let (Segment::Wildcard(name), Some(methods)) = (&child.kind, &child.methods) {
                if accept(methods) {
                    params.push(name.as_str(), segments.join("/"));
                    return Some(methods);
                }
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}
