pub mod scoring;
pub mod synthetic;

pub use scoring::*;
pub use synthetic::*;
