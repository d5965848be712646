//! Recording presentation backend.

use std::collections::{HashSet, VecDeque};

use crate::backend::{
    BackendError, ContextId, InputEvent, PresentationBackend, SurfaceId, TextureId,
};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateSurface {
        id: SurfaceId,
        title: String,
        x: i32,
        y: i32,
    },
    DestroySurface(SurfaceId),
    ResizeSurface {
        id: SurfaceId,
        width: u32,
        height: u32,
    },
    ShowSurface(SurfaceId),
    CreateContext {
        id: ContextId,
        surface: SurfaceId,
    },
    DestroyContext(ContextId),
    CreateTexture {
        id: TextureId,
        context: ContextId,
        width: u32,
        height: u32,
    },
    DestroyTexture(TextureId),
    UpdateTexture {
        id: TextureId,
        bytes: usize,
        stride: usize,
    },
    Clear(ContextId),
    Present {
        context: ContextId,
        texture: Option<TextureId>,
    },
}

/// Backend fake that records every call and serves scripted input.
///
/// Handle bookkeeping is strict: destroying an unknown handle panics, so
/// double-free bugs fail tests instead of passing silently.
pub struct SimBackend {
    next_id: u64,
    calls: Vec<BackendCall>,
    input: VecDeque<InputEvent>,
    live_surfaces: HashSet<u64>,
    live_contexts: HashSet<u64>,
    live_textures: HashSet<u64>,
    fail_create_surface: bool,
    fail_create_texture: bool,
}

impl SimBackend {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            calls: Vec::new(),
            input: VecDeque::new(),
            live_surfaces: HashSet::new(),
            live_contexts: HashSet::new(),
            live_textures: HashSet::new(),
            fail_create_surface: false,
            fail_create_texture: false,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue a scripted input event for the next poll.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push_back(event);
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces.len()
    }

    pub fn live_contexts(&self) -> usize {
        self.live_contexts.len()
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.len()
    }

    pub fn fail_create_surface(&mut self, fail: bool) {
        self.fail_create_surface = fail;
    }

    pub fn fail_create_texture(&mut self, fail: bool) {
        self.fail_create_texture = fail;
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationBackend for SimBackend {
    fn create_surface(&mut self, title: &str, x: i32, y: i32) -> Result<SurfaceId, BackendError> {
        if self.fail_create_surface {
            return Err(BackendError::new("injected surface failure"));
        }
        let id = SurfaceId(self.next_id());
        self.live_surfaces.insert(id.0);
        self.calls.push(BackendCall::CreateSurface {
            id,
            title: title.to_string(),
            x,
            y,
        });
        Ok(id)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        assert!(
            self.live_surfaces.remove(&surface.0),
            "destroy of unknown surface {surface:?}"
        );
        self.calls.push(BackendCall::DestroySurface(surface));
    }

    fn resize_surface(&mut self, surface: SurfaceId, width: u32, height: u32) {
        self.calls.push(BackendCall::ResizeSurface {
            id: surface,
            width,
            height,
        });
    }

    fn show_surface(&mut self, surface: SurfaceId) {
        self.calls.push(BackendCall::ShowSurface(surface));
    }

    fn create_context(&mut self, surface: SurfaceId) -> Result<ContextId, BackendError> {
        let id = ContextId(self.next_id());
        self.live_contexts.insert(id.0);
        self.calls.push(BackendCall::CreateContext { id, surface });
        Ok(id)
    }

    fn destroy_context(&mut self, context: ContextId) {
        assert!(
            self.live_contexts.remove(&context.0),
            "destroy of unknown context {context:?}"
        );
        self.calls.push(BackendCall::DestroyContext(context));
    }

    fn create_texture(
        &mut self,
        context: ContextId,
        width: u32,
        height: u32,
    ) -> Result<TextureId, BackendError> {
        if self.fail_create_texture {
            return Err(BackendError::new("injected texture failure"));
        }
        let id = TextureId(self.next_id());
        self.live_textures.insert(id.0);
        self.calls.push(BackendCall::CreateTexture {
            id,
            context,
            width,
            height,
        });
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        assert!(
            self.live_textures.remove(&texture.0),
            "destroy of unknown texture {texture:?}"
        );
        self.calls.push(BackendCall::DestroyTexture(texture));
    }

    fn update_texture(&mut self, texture: TextureId, data: &[u8], stride: usize) {
        self.calls.push(BackendCall::UpdateTexture {
            id: texture,
            bytes: data.len(),
            stride,
        });
    }

    fn clear(&mut self, context: ContextId) {
        self.calls.push(BackendCall::Clear(context));
    }

    fn present(&mut self, context: ContextId, texture: Option<TextureId>) {
        self.calls.push(BackendCall::Present { context, texture });
    }

    fn poll_input(&mut self) -> Option<InputEvent> {
        self.input.pop_front()
    }
}
