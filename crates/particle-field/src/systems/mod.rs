pub mod forces;
pub mod integrator;
pub mod render;
