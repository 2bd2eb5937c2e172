//! Frame loop control

/// Control flow after handling a frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlFlow {
    /// Keep delivering frames
    #[default]
    Continue,
    /// Stop the frame loop
    Exit,
}

impl ControlFlow {
    /// `Exit` when `done` is true
    pub fn exit_if(done: bool) -> Self {
        if done {
            ControlFlow::Exit
        } else {
            ControlFlow::Continue
        }
    }
}
