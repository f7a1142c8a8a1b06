use glam::Vec2;

use crate::api::types::{FrameHandle, HostEvent, ListenerHandle};
use crate::renderer::traits::Surface;

/// The environment a `ParticleField` runs in.
///
/// The host schedules frame callbacks, delivers resize and pointer events,
/// reports the container size and provides the drawing surface. Callbacks
/// flow back into the field through `ParticleField::on_frame`, `on_resize`
/// and `on_pointer_move`.
///
/// Failures are reported as `None`; the field logs them and keeps going.
pub trait Host {
    /// Current container size in container units.
    fn container_size(&self) -> Vec2;

    /// Width of the whole viewport. Particle sizes follow the screen class,
    /// not the container.
    fn viewport_width(&self) -> f32 {
        self.container_size().x
    }

    /// Schedule one frame callback before the next repaint.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    /// Cancel a scheduled frame callback. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Start delivering `event` to the field.
    fn listen(&mut self, event: HostEvent) -> Option<ListenerHandle>;

    /// Stop delivering a previously registered event. Unknown handles are ignored.
    fn unlisten(&mut self, handle: ListenerHandle);

    fn surface(&mut self) -> &mut dyn Surface;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::renderer::traits::RecordingSurface;

    /// In-memory host that tracks outstanding registrations.
    #[derive(Default)]
    pub struct MockHost {
        pub size: Vec2,
        pub surface: RecordingSurface,
        pub pending_frames: Vec<FrameHandle>,
        pub listeners: HashMap<ListenerHandle, HostEvent>,
        pub frames_requested: u32,
        pub frames_cancelled: u32,
        pub refuse_frames: bool,
        /// Falls back to the container width when unset.
        pub viewport_width: Option<f32>,
        /// Frames plus listeners currently registered; shared so it survives the host.
        pub outstanding: Rc<Cell<i32>>,
        next_id: u32,
    }

    impl MockHost {
        pub fn new(width: f32, height: f32) -> Self {
            Self {
                size: Vec2::new(width, height),
                ..Self::default()
            }
        }

        pub fn pending_frame(&self) -> Option<FrameHandle> {
            self.pending_frames.last().copied()
        }

        /// Fire the pending frame: it is no longer scheduled once delivered.
        pub fn take_frame(&mut self) -> Option<FrameHandle> {
            let handle = self.pending_frames.pop()?;
            self.outstanding.set(self.outstanding.get() - 1);
            Some(handle)
        }

        pub fn is_listening(&self, event: HostEvent) -> bool {
            self.listeners.values().any(|e| *e == event)
        }

        fn next(&mut self) -> u32 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl Host for MockHost {
        fn container_size(&self) -> Vec2 {
            self.size
        }

        fn viewport_width(&self) -> f32 {
            self.viewport_width.unwrap_or(self.size.x)
        }

        fn request_frame(&mut self) -> Option<FrameHandle> {
            if self.refuse_frames {
                return None;
            }
            let handle = FrameHandle(self.next());
            self.frames_requested += 1;
            self.pending_frames.push(handle);
            self.outstanding.set(self.outstanding.get() + 1);
            Some(handle)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let before = self.pending_frames.len();
            self.pending_frames.retain(|h| *h != handle);
            if self.pending_frames.len() != before {
                self.frames_cancelled += 1;
                self.outstanding.set(self.outstanding.get() - 1);
            }
        }

        fn listen(&mut self, event: HostEvent) -> Option<ListenerHandle> {
            let handle = ListenerHandle(self.next());
            self.listeners.insert(handle, event);
            self.outstanding.set(self.outstanding.get() + 1);
            Some(handle)
        }

        fn unlisten(&mut self, handle: ListenerHandle) {
            if self.listeners.remove(&handle).is_some() {
                self.outstanding.set(self.outstanding.get() - 1);
            }
        }

        fn surface(&mut self) -> &mut dyn Surface {
            &mut self.surface
        }
    }
}
