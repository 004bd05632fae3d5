//! `gwframe` — a reader/writer for the LIGO/Virgo Frame (`.gwf`) binary
//! format: gravitational-wave interferometer data, framed into
//! fixed-duration time segments with a self-describing, reference-linked
//! object graph.
//!
//! Versions 3, 4, 6, 7 and 8 are supported for reading; writing always
//! targets the current in-memory shape (version 8) unless the caller
//! explicitly demotes. See [`stream`] for the read/write façade,
//! [`verify`] for independent structural auditing, and [`model`] for the
//! decoded object graph itself.

pub mod arena;
pub mod buffer;
pub mod checksum;
pub mod codec;
pub mod codecs;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod filename;
pub mod kind;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod stream;
pub mod toc;
pub mod verify;
pub mod version;

pub use arena::{Arena, ObjIndex};
pub use codec::ByteOrder;
pub use config::{ChecksumPolicy, StreamConfig};
pub use error::{Error, Result};
pub use filename::FrameFilename;
pub use kind::{KindId, Version};
pub use model::Kind;
pub use stream::{FrameReader, FrameWriter};
pub use verify::{Finding, VerifyConfig, VerifyReport, Verifier};
