pub mod channels;
pub mod schedule;

pub use channels::*;
pub use schedule::*;
