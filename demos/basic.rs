//! Basic example: a sparse 64-bit shadow
//!
//! This example demonstrates:
//! - Splitting 64-bit addresses into `[20, 20, 24]`
//! - Using a 16 MiB byte leaf as the distinguished leaf
//! - Reads of untouched memory that allocate nothing
//! - Writes that allocate only the nodes on their path

use shadow_trie::prelude::*;

/// Shadow byte of memory nobody has written yet.
const UNWRITTEN: u8 = b'u';

/// Leaf covering 2^24 addresses, one shadow byte each.
type Leaf = ArrayLeaf<u8, { 1 << 24 }>;

pub fn main() {
    // Far too large for the stack, so build it on the heap
    let distinguished = Leaf::boxed(UNWRITTEN);

    let mut shadow: ShadowMap<u64, Leaf> = ShadowMapBuilder::new()
        .address::<u64>()
        .partition(&[20, 20, 24])
        .distinguished(&*distinguished)
        .heap_allocator()
        .build();

    // ========== Reads Before Any Write ==========
    // Every address reads as the distinguished leaf, only the root exists
    assert_eq!(shadow.get(0xabcd_ef09_8765_4321), UNWRITTEN);
    assert!(core::ptr::eq(shadow.read(0), &*distinguished));
    assert_eq!(shadow.stats().leaves, 0);

    // ========== Writes ==========
    // Both addresses share their top 20 bits but not the middle field,
    // so they end up in two different leaves under one level-1 node
    shadow.set(0xabcd_ef09_8765_4321, b'5');
    shadow.set(0xabcd_e559_8765_4321, b'5');

    assert_eq!(shadow.get(0xabcd_ef09_8765_4321), b'5');
    assert_eq!(shadow.get(0xabcd_e559_8765_4321), b'5');
    assert_eq!(shadow.get(0xabcd_ef09_8765_4322), UNWRITTEN);

    let stats = shadow.stats();
    assert_eq!(stats.levels, 2);
    assert_eq!(stats.leaves, 2);

    // ========== Address Arithmetic ==========
    // Offsets and runs never touch the trie
    assert_eq!(shadow.leaf_local_offset(0xabcd_ef09_8765_4321), 0x65_4321);
    assert_eq!(shadow.contiguous_run(0xabcd_ef09_8765_4321), 0x9a_bcdf);
    assert_eq!(shadow.leaf_size(), 1 << 24);

    // ========== Strict Lookups ==========
    // Tell written ranges apart from untouched ones without allocating
    assert!(shadow.strict(0xabcd_ef09_8700_0000).is_some());
    assert!(shadow.strict(0x0000_0000_0000_0000).is_none());
    assert_eq!(shadow.stats().leaves, 2);
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_example() {
        super::main();
    }
}
