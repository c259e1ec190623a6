mod compat;
mod error;
mod names;
mod value;
pub mod wire;

pub use compat::*;
pub use error::*;
pub use names::*;
pub use value::*;
