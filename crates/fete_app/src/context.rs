//! Mount context for fete_app components

use std::fmt;
use std::rc::Rc;

use fete_core::Document;
use fete_platform::FrameSource;

/// What a component needs to render and animate: the page it renders into
/// and the refresh source its effects are scheduled on
#[derive(Clone)]
pub struct MountContext {
    pub document: Document,
    pub frames: Rc<dyn FrameSource>,
}

impl MountContext {
    pub fn new(document: Document, frames: Rc<dyn FrameSource>) -> Self {
        Self { document, frames }
    }
}

impl fmt::Debug for MountContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountContext")
            .field("document", &self.document)
            .field("now", &self.frames.now())
            .finish()
    }
}
