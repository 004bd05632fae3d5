//! Three buffer shapes, one capability: a seekable, byte-addressable
//! substrate for the stream façade to read and write against.

mod dynamic;
mod memory;
mod slice;

pub use dynamic::{DynamicBuffer, ScanState};
pub use memory::MemoryBuffer;
pub use slice::SliceBuffer;

use std::io::{Read, Seek, Write};

/// Capability every blocking buffer shape satisfies. [`DynamicBuffer`] is
/// deliberately not a `FrameBuffer` — it never blocks on bytes, it fails
/// with [`crate::error::Error::NeedMoreData`] instead, which is a
/// fundamentally different contract from `Read`.
pub trait FrameBuffer: Read + Write + Seek {}

impl<T: Read + Write + Seek> FrameBuffer for T {}
