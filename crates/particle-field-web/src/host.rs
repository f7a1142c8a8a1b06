use std::cell::Cell;
use std::f64::consts::TAU;
use std::rc::Rc;

use glam::Vec2;
use particle_field::{FrameHandle, Host, HostEvent, ListenerHandle, Rgba, Surface};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, Window};

/// Canvas 2D implementation of `Surface`.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Create a canvas that covers `container` and sits behind its content.
    pub fn attach(container: &HtmlElement) -> Result<Self, JsValue> {
        let document = container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container has no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;

        let style = canvas.style();
        style.set_property("position", "absolute")?;
        style.set_property("inset", "0")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("pointer-events", "none")?;
        container.append_child(&canvas)?;

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        Ok(Self { canvas, ctx })
    }

    fn detach(&self) {
        self.canvas.remove();
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: f32, height: f32) {
        self.canvas.set_width(width.max(1.0) as u32);
        self.canvas.set_height(height.max(1.0) as u32);
    }

    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .is_err()
        {
            return;
        }
        self.ctx.set_fill_style_str(&color.to_string());
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }
}

/// `Host` backed by the browser: `requestAnimationFrame`, window resize and
/// container mousemove listeners, and a canvas surface.
///
/// Callbacks are created once and reach the mounted field through
/// `crate::with_field`, so they stay valid across frames.
pub struct BrowserHost {
    window: Window,
    container: HtmlElement,
    surface: CanvasSurface,
    /// Frame currently scheduled with `requestAnimationFrame`.
    pending_frame: Rc<Cell<Option<FrameHandle>>>,
    on_frame: Closure<dyn FnMut(f64)>,
    on_resize: Closure<dyn FnMut()>,
    on_mouse_move: Closure<dyn FnMut(MouseEvent)>,
    listeners: Vec<(ListenerHandle, HostEvent)>,
    next_listener: u32,
}

impl BrowserHost {
    pub fn new(window: Window, container: HtmlElement) -> Result<Self, JsValue> {
        let surface = CanvasSurface::attach(&container)?;
        let pending_frame = Rc::new(Cell::new(None));

        let pending = pending_frame.clone();
        let on_frame = Closure::<dyn FnMut(f64)>::new(move |now_ms: f64| {
            if let Some(handle) = pending.take() {
                crate::with_field(|field| field.on_frame(handle, now_ms));
            }
        });

        let on_resize = Closure::<dyn FnMut()>::new(|| {
            crate::with_field(|field| field.on_resize());
        });

        let target = container.clone();
        let on_mouse_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let rect = target.get_bounding_client_rect();
            let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
            let origin = Vec2::new(rect.left() as f32, rect.top() as f32);
            crate::with_field(|field| field.on_pointer_move(client, origin));
        });

        Ok(Self {
            window,
            container,
            surface,
            pending_frame,
            on_frame,
            on_resize,
            on_mouse_move,
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    fn add_listener(&self, event: HostEvent) -> Result<(), JsValue> {
        match event {
            HostEvent::Resize => self
                .window
                .add_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref()),
            HostEvent::PointerMove => self.container.add_event_listener_with_callback(
                "mousemove",
                self.on_mouse_move.as_ref().unchecked_ref(),
            ),
        }
    }

    fn remove_listener(&self, event: HostEvent) -> Result<(), JsValue> {
        match event {
            HostEvent::Resize => self
                .window
                .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref()),
            HostEvent::PointerMove => self.container.remove_event_listener_with_callback(
                "mousemove",
                self.on_mouse_move.as_ref().unchecked_ref(),
            ),
        }
    }
}

impl Host for BrowserHost {
    fn container_size(&self) -> Vec2 {
        Vec2::new(
            self.container.client_width() as f32,
            self.container.client_height() as f32,
        )
    }

    fn viewport_width(&self) -> f32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .map(|w| w as f32)
            .unwrap_or_else(|| self.container_size().x)
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        match self
            .window
            .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
        {
            Ok(id) => {
                let handle = FrameHandle(id as u32);
                self.pending_frame.set(Some(handle));
                Some(handle)
            }
            Err(err) => {
                log::warn!("requestAnimationFrame failed: {:?}", err);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending_frame.get() != Some(handle) {
            return;
        }
        self.pending_frame.set(None);
        if let Err(err) = self.window.cancel_animation_frame(handle.0 as i32) {
            log::warn!("cancelAnimationFrame failed: {:?}", err);
        }
    }

    fn listen(&mut self, event: HostEvent) -> Option<ListenerHandle> {
        if let Err(err) = self.add_listener(event) {
            log::warn!("addEventListener({:?}) failed: {:?}", event, err);
            return None;
        }
        self.next_listener += 1;
        let handle = ListenerHandle(self.next_listener);
        self.listeners.push((handle, event));
        Some(handle)
    }

    fn unlisten(&mut self, handle: ListenerHandle) {
        let Some(index) = self.listeners.iter().position(|(h, _)| *h == handle) else {
            return;
        };
        let (_, event) = self.listeners.swap_remove(index);
        if let Err(err) = self.remove_listener(event) {
            log::warn!("removeEventListener({:?}) failed: {:?}", event, err);
        }
    }

    fn surface(&mut self) -> &mut dyn Surface {
        &mut self.surface
    }
}

impl Drop for BrowserHost {
    fn drop(&mut self) {
        // Normally empty: `ParticleField::stop` runs before the host drops.
        if let Some(frame) = self.pending_frame.take() {
            let _ = self.window.cancel_animation_frame(frame.0 as i32);
        }
        for (_, event) in std::mem::take(&mut self.listeners) {
            let _ = self.remove_listener(event);
        }
        self.surface.detach();
    }
}
