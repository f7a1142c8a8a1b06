pub mod particle;
pub mod time;
#[cfg(feature = "physics")]
pub mod physics;
