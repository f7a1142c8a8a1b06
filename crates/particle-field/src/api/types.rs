use std::fmt;

/// Token for a frame callback scheduled with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u32);

/// Token for an event listener registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u32);

/// Host events the field subscribes to while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// The container (or viewport) changed size.
    Resize,
    /// The pointer moved inside the container.
    PointerMove,
}

impl HostEvent {
    pub const ALL: [HostEvent; 2] = [HostEvent::Resize, HostEvent::PointerMove];
}

/// Straight-alpha colour. Channels are 0-255, alpha is 0.0-1.0 (CSS convention).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white(a: f32) -> Self {
        Self::new(255, 255, 255, a)
    }

    /// Same colour with a different alpha, clamped to [0, 1].
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: if a.is_finite() { a.clamp(0.0, 1.0) } else { 0.0 },
            ..self
        }
    }
}

impl fmt::Display for Rgba {
    /// Formats as a CSS `rgba(r, g, b, a)` string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_formatting() {
        assert_eq!(Rgba::white(0.5).to_string(), "rgba(255, 255, 255, 0.5)");
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Rgba::white(0.5).with_alpha(3.0).a, 1.0);
        assert_eq!(Rgba::white(0.5).with_alpha(-1.0).a, 0.0);
        assert_eq!(Rgba::white(0.5).with_alpha(f32::NAN).a, 0.0);
    }
}
