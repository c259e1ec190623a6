//! # Wire format
//!
//! Values are written into a caller-owned byte buffer, starting at a caller-chosen offset.
//! Nothing self-describing is written: the shape of the bytes is known only to the
//! compiled serializer that wrote them, and the two sides must agree on the
//! [`CompatibilityLevel`](crate::CompatibilityLevel) out of band.
//!
//! The below pseudocode depicts the building blocks.
//!
//! ```text
//! scalar {
//!     body:           [u8; width],        // bool 1, char 4, ints and floats their width.
//!                                         // Byte order per compatibility level.
//! }
//!
//! var_length int {
//!     body:           LEB128,             // Signed kinds are zig-zag mapped first.
//! }
//!
//! string {
//!     len:            u32 or LEB128,
//!     body:           [u8; len],          // UTF-8.
//! }
//!
//! list {
//!     count:          u32 or LEB128,
//!     member_0:       *,
//!     ...
//! }
//!
//! nullable {
//!     presence:       u8,                 // 0 absent, 1 present.
//!     body:           *,                  // Only when present.
//! }
//!
//! nullable bool, packed {
//!     body:           u8,                 // 0 null, 1 false, 2 true.
//! }
//!
//! record {
//!     field_0:        *,                  // In declared order.
//!     ...                                 // Fields added after the active version are absent.
//! }
//!
//! subtype envelope {
//!     discriminant:   u8, u16 or LEB128,
//!     payload:        record,
//! }
//! ```

mod fixed;
mod lengths;
mod reader;
pub mod varint;
mod writer;


pub use fixed::*;
pub use lengths::*;
pub use reader::*;
pub use writer::*;

/// How deeply records may nest within one encoded value.
pub const MAX_NESTING_DEPTH: usize = 256;
