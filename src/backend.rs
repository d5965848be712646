//! Presentation backend interface.
//!
//! Surface creation, drawing and input polling all happen through this
//! interface, and only ever on the presentation thread. Input cannot be
//! delivered asynchronously; it must be polled, which is why the event loop
//! waits with a bounded timeout.

use std::fmt;

/// Opaque window/surface handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Opaque drawing context handle, bound to one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

/// Opaque texture handle, bound to one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BackendError {}

/// Keys the viewer reacts to. Anything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    C,
    A,
    S,
    T,
    P,
    R,
    H,
    Q,
    Other,
}

/// Input event polled from the backend, tagged with its target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    CloseRequested(SurfaceId),
    PointerClick(SurfaceId),
    KeyUp(SurfaceId, Key),
}

impl InputEvent {
    pub fn surface(&self) -> SurfaceId {
        match *self {
            InputEvent::CloseRequested(id) => id,
            InputEvent::PointerClick(id) => id,
            InputEvent::KeyUp(id, _) => id,
        }
    }
}

/// Windowing and rendering backend.
///
/// All methods must be called from the presentation thread.
pub trait PresentationBackend {
    /// Create a hidden, zero-sized surface at the given screen position.
    fn create_surface(&mut self, title: &str, x: i32, y: i32) -> Result<SurfaceId, BackendError>;
    fn destroy_surface(&mut self, surface: SurfaceId);
    fn resize_surface(&mut self, surface: SurfaceId, width: u32, height: u32);
    fn show_surface(&mut self, surface: SurfaceId);

    fn create_context(&mut self, surface: SurfaceId) -> Result<ContextId, BackendError>;
    fn destroy_context(&mut self, context: ContextId);

    fn create_texture(
        &mut self,
        context: ContextId,
        width: u32,
        height: u32,
    ) -> Result<TextureId, BackendError>;
    fn destroy_texture(&mut self, texture: TextureId);

    /// Upload pixel data into a texture. `stride` is the source row stride in
    /// bytes.
    fn update_texture(&mut self, texture: TextureId, data: &[u8], stride: usize);

    /// Clear the context to black.
    fn clear(&mut self, context: ContextId);

    /// Present the context, copying the texture to it first when given.
    fn present(&mut self, context: ContextId, texture: Option<TextureId>);

    /// Poll the next pending input event, if any.
    fn poll_input(&mut self) -> Option<InputEvent>;
}
