//! A `no_std` multi-level shadow memory index.
//!
//! Instrumentation tools (memory checkers, samplers, taint trackers) need a
//! metadata slot for every address of a huge, mostly unused address space.
//! This crate keeps that metadata in a sparse trie that only grows where the
//! tool actually writes.
//!
//! # Features
//!
//! - **Lazy allocation** - levels and leaves appear on the first write into their range
//! - **Free reads of untouched memory** - unwritten ranges read as one shared distinguished leaf
//! - **Stable storage** - a leaf never moves once allocated
//! - **Pluggable memory** - levels and leaves come from an [`AllocatorPort`](shadow::AllocatorPort)
//! - **Custom leaf layouts** - array-of-structures out of the box, anything via [`ShadowLeaf`](shadow::ShadowLeaf)
//!
//! # Architecture
//!
//! An address is split by a [`Partition`](shadow::Partition) into fields,
//! most significant first. Each field but the last indexes one trie level;
//! the last one is the offset inside a leaf:
//!
//! ```text
//!  address  0xabcdef0987654321, partition [20, 20, 24]
//!
//!  ┌─────────────┬─────────────┬──────────────────┐
//!  │  abcde (20) │  f0987 (20) │  654321 (24)     │
//!  └──────┬──────┴──────┬──────┴────────┬─────────┘
//!         ▼             ▼               ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────────┐
//!   │  root    │──▶│ level 1  │──▶│ leaf (2^24)  │
//!   │ 2^20 ptr │   │ 2^20 ptr │   │ shadow data  │
//!   └──────────┘   └──────────┘   └──────────────┘
//!         │ null slot
//!         ▼
//!   distinguished leaf (reads only)
//! ```
//!
//! - **Reads** follow the path and stop at the first null slot, returning the
//!   distinguished leaf without allocating
//! - **Writes** allocate every missing node on the path; new leaves start as a
//!   copy of the distinguished leaf
//! - **Drop** frees every allocated node exactly once
//!
//! # Example
//!
//! ```rust
//! use shadow_trie::prelude::*;
//!
//! // One validity byte per address of a 32-bit space, 4 KiB leaves.
//! static UNDEFINED: ArrayLeaf<u8, 4096> = ArrayLeaf::filled(0x00);
//!
//! let mut shadow = ShadowMapBuilder::new()
//!     .address::<u32>()
//!     .partition(&[8, 12, 12])
//!     .distinguished(&UNDEFINED)
//!     .heap_allocator()
//!     .build();
//!
//! // the program stored 8 bytes at 0x1000_0ffc
//! shadow.fill(0x1000_0ffc, 8, 0xFF).unwrap();
//!
//! // a 4-byte load that stays inside one leaf
//! let defined = shadow
//!     .with_ro_slice(0x1000_0ffc, 4, |bytes| bytes.all_eq(0xFF))
//!     .unwrap();
//! assert!(defined);
//!
//! // memmove(0x2000_0000, 0x1000_0ffc, 8) carries the shadow along
//! shadow.copy(0x1000_0ffc, 0x2000_0000, 8).unwrap();
//! assert_eq!(shadow.get(0x2000_0007), 0xFF);
//! assert_eq!(shadow.get(0x2000_0008), 0x00);
//! ```

#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod shadow;

pub mod prelude {
    pub use crate::shadow::prelude::*;
}
