//! Fete Core
//!
//! Foundational types shared by every Fete crate:
//!
//! - **Geometry**: points, sizes, rectangles, 3D vectors and colors
//! - **Element Tree**: a retained, single-threaded stand-in for a page document
//! - **Disposal**: cloneable release actions and scope guards
//!
//! # Example
//!
//! ```rust
//! use fete_core::{Color, Document, NodeRef, Size};
//!
//! let doc = Document::new(Size::new(1280.0, 720.0));
//! let container = NodeRef::new();
//!
//! doc.with_mut(|tree| {
//!     let div = tree.create_element("div");
//!     tree.style_mut(div).unwrap().background = Some(Color::from_hex(0xF0A848));
//!     let root = tree.root();
//!     tree.append_child(root, div);
//!     container.set(Some(div));
//! });
//!
//! assert!(container.resolve(&doc).is_some());
//! ```

pub mod dispose;
pub mod dom;
pub mod geometry;

pub use dispose::{DisposeGuard, Disposer};
pub use dom::{Document, Element, ElementId, ElementStyle, ElementTree, NodeRef, Transform3D};
pub use geometry::{Color, Point, Rect, Size, Vec3};
