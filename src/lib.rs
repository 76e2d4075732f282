//! 200-bit time-ordered identifiers assembled through a generic bit-region
//! codec
//!
//! ```rust
//! use uuid200::uuid200;
//!
//! let id = uuid200();
//! println!("{}", id); // e.g., "AEDLFJ47FgDi0JpLedOp/E2DpwmcTJShpg=="
//! println!("{}", id.to_sortable_string()); // "{order}-{payload}"
//! println!("{:?}", id.as_bytes()); // as 25-byte array
//! ```
//!
//! # Field and bit layout
//!
//! An identifier is exactly 25 bytes (200 bits) wide. Bit positions count
//! from the least significant bit of byte 0, and every field is packed LSB
//! first within its range:
//!
//! | Field     | Bits | Position  | Meaning                            |
//! |-----------|------|-----------|------------------------------------|
//! | timestamp | 52   | [0, 52)   | microseconds since the Unix epoch  |
//! | counter   | 12   | [52, 64)  | rotation counter, wraps at 4096    |
//! | version   | 2    | [64, 66)  | payload layout selector            |
//! | payload   | 134  | [66, 200) | version-specific                   |
//!
//! Version 1 places a 16-bit site prefix at [66, 82) ahead of 118 random
//! bits; version 2 fills all 134 payload bits with random data. The
//! timestamp and counter positions are version-independent, so the
//! chronological sort key ([`Uuid::order`]) is always extractable without
//! inspecting the version tag.
//!
//! Within one microsecond the rotation counter distinguishes up to 4096
//! identifiers; past that it silently wraps and uniqueness rests on the
//! random payload alone. Identifiers are compared chronologically through
//! their order keys:
//!
//! ```rust
//! use uuid200::{uuid200, Uuid};
//!
//! let mut ids: Vec<Uuid> = (0..8).map(|_| uuid200()).collect();
//! ids.sort_by_key(Uuid::order);
//! ```
//!
//! The [`bits`] module exposes the codec the generators are built on:
//! pure functions copying an arbitrary bit range between byte buffers.

mod uuid;
pub use crate::uuid::{ParseError, Uuid, Version};

pub mod bits;

mod generator;
pub use generator::Generator;

mod global_gen;
pub use global_gen::uuid200;
