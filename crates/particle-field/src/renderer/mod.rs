pub mod draw_list;
pub mod traits;

pub use draw_list::{DrawCommand, DrawList};
pub use traits::{RecordingSurface, Surface};
