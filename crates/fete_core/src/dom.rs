//! In-memory element tree
//!
//! A small retained tree of elements standing in for a browser document.
//! Elements carry a tag, attributes, optional text, inline style and an
//! absolute bounding rectangle. There is no layout engine: whoever builds
//! the tree assigns bounds explicitly.
//!
//! The tree is single-threaded. [`Document`] shares it between the page,
//! components and running animations via `Rc<RefCell<_>>`.
//!
//! # Example
//!
//! ```rust
//! use fete_core::{Document, Rect, Size};
//!
//! let doc = Document::new(Size::new(800.0, 600.0));
//! let container = doc.with_mut(|tree| {
//!     let div = tree.create_element("div");
//!     tree.set_bounds(div, Rect::new(0.0, 0.0, 800.0, 600.0));
//!     let root = tree.root();
//!     tree.append_child(root, div);
//!     div
//! });
//! assert_eq!(doc.with(|tree| tree.children(tree.root()).to_vec()), vec![container]);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::geometry::{Color, Rect, Size, Vec3};

new_key_type! {
    /// Handle to an element in an [`ElementTree`]
    pub struct ElementId;
}

/// 3D transform applied to an element: a translation followed by a rotation
/// of `angle` degrees around `axis`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform3D {
    pub translate: Vec3,
    pub axis: Vec3,
    pub angle: f32,
}

impl Transform3D {
    pub fn new(translate: Vec3, axis: Vec3, angle: f32) -> Self {
        Self {
            translate,
            axis,
            angle,
        }
    }
}

/// Formats as a CSS transform value
impl fmt::Display for Transform3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate3d({}px, {}px, {}px) rotate3d({},{},{},{}deg)",
            self.translate.x,
            self.translate.y,
            self.translate.z,
            self.axis.x,
            self.axis.y,
            self.axis.z,
            self.angle
        )
    }
}

/// Inline style of an element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementStyle {
    pub transform: Option<Transform3D>,
    /// `None` means fully opaque
    pub opacity: Option<f32>,
    pub background: Option<Color>,
}

impl ElementStyle {
    pub fn is_empty(&self) -> bool {
        self.transform.is_none() && self.opacity.is_none() && self.background.is_none()
    }
}

/// A single node of the tree
#[derive(Clone, Debug)]
pub struct Element {
    pub tag: &'static str,
    pub attributes: FxHashMap<&'static str, String>,
    pub text: Option<String>,
    pub style: ElementStyle,
    /// Absolute bounding rectangle
    pub bounds: Rect,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attributes: FxHashMap::default(),
            text: None,
            style: ElementStyle::default(),
            bounds: Rect::ZERO,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Owner of every element of a page
pub struct ElementTree {
    nodes: SlotMap<ElementId, Element>,
    root: ElementId,
    viewport: Size,
}

impl ElementTree {
    /// Create a tree whose `body` root covers the viewport
    pub fn new(viewport: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut body = Element::new("body");
        body.bounds = viewport.to_rect();
        let root = nodes.insert(body);
        Self {
            nodes,
            root,
            viewport,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Size of the visible area (the browser's inner width/height)
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        if let Some(body) = self.nodes.get_mut(self.root) {
            body.bounds = viewport.to_rect();
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &'static str) -> ElementId {
        self.nodes.insert(Element::new(tag))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|e| e.parent)
    }

    /// Children of `id` in insertion order (empty for unknown ids)
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes.get(id).map(|e| e.children()).unwrap_or(&[])
    }

    pub fn style(&self, id: ElementId) -> Option<&ElementStyle> {
        self.nodes.get(id).map(|e| &e.style)
    }

    pub fn style_mut(&mut self, id: ElementId) -> Option<&mut ElementStyle> {
        self.nodes.get_mut(id).map(|e| &mut e.style)
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &'static str, value: impl Into<String>) {
        if let Some(element) = self.nodes.get_mut(id) {
            element.attributes.insert(name, value.into());
        }
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(element) = self.nodes.get_mut(id) {
            element.text = Some(text.into());
        }
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(element) = self.nodes.get_mut(id) {
            element.bounds = bounds;
        }
    }

    /// Absolute bounds of a live element
    pub fn bounding_client_rect(&self, id: ElementId) -> Option<Rect> {
        self.nodes.get(id).map(|e| e.bounds)
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere
    ///
    /// Returns false when either id is stale or the move would create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            tracing::warn!("refusing to append an element into its own subtree");
            return false;
        }
        self.remove_from_parent(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        true
    }

    /// Append several children in order; returns how many were attached
    pub fn append_children(
        &mut self,
        parent: ElementId,
        children: impl IntoIterator<Item = ElementId>,
    ) -> usize {
        children
            .into_iter()
            .filter(|&child| self.append_child(parent, child))
            .count()
    }

    /// Detach an element from its parent, keeping it alive
    ///
    /// Returns true if the element was attached.
    pub fn remove_from_parent(&mut self, id: ElementId) -> bool {
        let Some(parent) = self.nodes.get_mut(id).and_then(|e| e.parent.take()) else {
            return false;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&c| c != id);
        }
        true
    }

    /// Detach an element and free it together with its whole subtree
    ///
    /// The root cannot be destroyed. Returns the number of freed elements.
    pub fn destroy(&mut self, id: ElementId) -> usize {
        if id == self.root || !self.nodes.contains_key(id) {
            return 0;
        }
        self.remove_from_parent(id);

        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(element) = self.nodes.remove(next) {
                stack.extend(element.children);
                freed += 1;
            }
        }
        freed
    }

    /// Number of live elements, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first search for the first element with the given `id` attribute
    pub fn find_by_id(&self, value: &str) -> Option<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&e| self.nodes[e].attribute("id") == Some(value))
    }

    /// All elements below `id` in document order, `id` included
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(element) = self.nodes.get(next) else {
                continue;
            };
            out.push(next);
            stack.extend(element.children.iter().rev());
        }
        out
    }

    fn is_ancestor_or_self(&self, ancestor: ElementId, mut node: ElementId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn fmt_element(&self, f: &mut fmt::Formatter<'_>, id: ElementId, depth: usize) -> fmt::Result {
        let Some(element) = self.nodes.get(id) else {
            return Ok(());
        };
        write!(f, "{:indent$}<{}", "", element.tag, indent = depth * 2)?;

        let mut attributes: Vec<_> = element.attributes.iter().collect();
        attributes.sort();
        for (name, value) in attributes {
            write!(f, " {name}=\"{value}\"")?;
        }

        if !element.style.is_empty() {
            let mut parts = Vec::new();
            if let Some(transform) = element.style.transform {
                parts.push(format!("transform: {transform}"));
            }
            if let Some(opacity) = element.style.opacity {
                parts.push(format!("opacity: {opacity}"));
            }
            if let Some(background) = element.style.background {
                parts.push(format!("background-color: {background}"));
            }
            write!(f, " style=\"{}\"", parts.join("; "))?;
        }
        write!(f, ">")?;

        if let Some(text) = &element.text {
            write!(f, "{text}")?;
        }
        writeln!(f)?;

        for &child in &element.children {
            self.fmt_element(f, child, depth + 1)?;
        }
        Ok(())
    }
}

/// Pretty-prints the attached tree starting at the root
impl fmt::Display for ElementTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_element(f, self.root, 0)
    }
}

/// Shared, single-threaded handle to an [`ElementTree`]
#[derive(Clone)]
pub struct Document {
    tree: Rc<RefCell<ElementTree>>,
}

impl Document {
    pub fn new(viewport: Size) -> Self {
        Self {
            tree: Rc::new(RefCell::new(ElementTree::new(viewport))),
        }
    }

    /// Read access to the tree
    ///
    /// # Panics
    ///
    /// Panics if called while the tree is mutably borrowed (re-entrant use
    /// from inside [`Document::with_mut`]).
    pub fn with<R>(&self, f: impl FnOnce(&ElementTree) -> R) -> R {
        f(&self.tree.borrow())
    }

    /// Write access to the tree
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut ElementTree) -> R) -> R {
        f(&mut self.tree.borrow_mut())
    }

    pub fn root(&self) -> ElementId {
        self.with(|tree| tree.root())
    }

    pub fn viewport(&self) -> Size {
        self.with(|tree| tree.viewport())
    }

    pub fn element_count(&self) -> usize {
        self.with(|tree| tree.len())
    }

    pub fn bounding_client_rect(&self, id: ElementId) -> Option<Rect> {
        self.with(|tree| tree.bounding_client_rect(id))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.element_count())
            .finish()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|tree| fmt::Display::fmt(tree, f))
    }
}

/// A shared slot that a component fills with the element it rendered
///
/// Starts empty; cloning yields another handle to the same slot.
#[derive(Clone, Default)]
pub struct NodeRef {
    current: Rc<Cell<Option<ElementId>>>,
}

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ref that already points at `id`
    pub fn to(id: ElementId) -> Self {
        let node_ref = Self::new();
        node_ref.set(Some(id));
        node_ref
    }

    pub fn current(&self) -> Option<ElementId> {
        self.current.get()
    }

    pub fn set(&self, id: Option<ElementId>) {
        self.current.set(id);
    }

    /// The element this ref points at, if it is still alive in `doc`
    pub fn resolve(&self, doc: &Document) -> Option<ElementId> {
        self.current()
            .filter(|&id| doc.with(|tree| tree.contains(id)))
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.current()).finish()
    }
}
