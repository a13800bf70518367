//! Rendering module
//!
//! `frame` tessellates a session snapshot on the CPU; `pipeline` presents the
//! result through WebGPU. Anything implementing `FrameSink` can stand in for
//! the GPU.

pub mod frame;
pub mod pipeline;
pub mod shapes;
pub mod vertex;
pub mod viewport;

pub use frame::{Frame, build_frame};
pub use pipeline::RenderState;
pub use vertex::Vertex;
pub use viewport::Letterbox;

use crate::error::RenderError;

/// Destination for built frames
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError>;
}

/// Sink that keeps statistics instead of drawing
#[derive(Debug, Default)]
pub struct HeadlessSink {
    pub frames: u64,
    pub last_vertex_count: usize,
    pub peak_vertex_count: usize,
}

impl FrameSink for HeadlessSink {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.frames += 1;
        self.last_vertex_count = frame.vertex_count();
        self.peak_vertex_count = self.peak_vertex_count.max(frame.vertex_count());
        Ok(())
    }
}
