use glam::Vec2;

/// Last known pointer position in container coordinates.
/// `None` until the pointer first moves over the container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Option<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn clear(&mut self) {
        self.position = None;
    }
}

/// Translates host pointer events into `PointerState`.
/// Raw positions only; the force falloff already absorbs jitter.
#[derive(Debug, Default)]
pub struct InputAdapter;

impl InputAdapter {
    /// Client (viewport) coordinates to container-relative coordinates.
    pub fn to_container(client: Vec2, container_origin: Vec2) -> Vec2 {
        client - container_origin
    }

    /// Record a pointer move. Non-finite input is ignored.
    pub fn pointer_moved(state: &mut PointerState, client: Vec2, container_origin: Vec2) {
        let local = Self::to_container(client, container_origin);
        if local.is_finite() {
            state.position = Some(local);
        }
    }
}
