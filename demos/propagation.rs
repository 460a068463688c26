//! Propagation example: a tiny definedness checker
//!
//! This example demonstrates:
//! - Tracking one "defined" byte per address of a 32-bit space
//! - Propagating shadow across memset and memmove
//! - Checking a load through a byte view
//! - Sharing the map with a handler through `SharedShadowMap`

use shadow_trie::prelude::*;

const UNDEFINED: u8 = 0x00;
const DEFINED: u8 = 0xFF;

static UNDEFINED_LEAF: ArrayLeaf<u8, 4096> = ArrayLeaf::filled(UNDEFINED);

type Shadow = ShadowMap<'static, u32, ArrayLeaf<u8, 4096>>;

/// Offset of the first undefined byte of a `len`-byte load, if any.
fn check_load(shadow: &Shadow, addr: u32, len: usize) -> Result<Option<usize>, ShadowError> {
    shadow.with_ro_slice(addr, len, |bytes| bytes.position_ne(DEFINED))
}

pub fn main() {
    let mut shadow: Shadow = ShadowMapBuilder::new()
        .address::<u32>()
        .partition(&[8, 12, 12])
        .distinguished(&UNDEFINED_LEAF)
        .heap_allocator()
        .build();

    // ========== memset(buf, 0, 64) ==========
    let buf = 0x0804_8000u32;
    shadow.fill(buf, 64, DEFINED).unwrap();
    assert_eq!(check_load(&shadow, buf + 60, 4).unwrap(), None);

    // ========== Uninitialized Load ==========
    // Reading past the initialized part is reported at the first bad byte
    assert_eq!(check_load(&shadow, buf + 62, 4).unwrap(), Some(2));

    // ========== Partial Store ==========
    // Storing a u16 in the middle of an undefined word
    let word = 0x0804_9000u32;
    shadow
        .with_rw_slice(word, 4, |mut bytes| bytes.write_u16_le_at(1, 0xFFFF))
        .unwrap();
    assert_eq!(check_load(&shadow, word, 4).unwrap(), Some(0));
    assert_eq!(shadow.with_ro_slice(word, 4, |bytes| bytes.read_u32_be_at(0)).unwrap(), 0x00FF_FF00);

    // ========== memmove Across a Leaf Boundary ==========
    // The destination straddles two leaves; the overlap is handled like memmove
    shadow.copy(buf, buf + 0xFE0, 64).unwrap();
    shadow.copy(buf + 0xFE0, buf + 0xFF0, 64).unwrap();
    let mut out = [UNDEFINED; 64];
    shadow.read_into(buf + 0xFF0, &mut out).unwrap();
    assert!(out.iter().all(|&b| b == DEFINED));

    // Loads that straddle a leaf must be split by the caller
    assert_eq!(
        check_load(&shadow, buf + 0xFFE, 4),
        Err(ShadowError::CrossesLeaf)
    );

    // ========== Shared With a Handler ==========
    let shared = SharedShadowMap::new(shadow);
    let report = shared.with_map(|shadow| check_load(shadow, buf, 8));
    assert_eq!(report, Ok(None));

    // In a handler that cannot be preempted by other users of the map
    unsafe {
        shared.with_map_unchecked(|shadow| shadow.set(buf + 3, UNDEFINED));
    }
    let shadow = shared.into_inner();
    assert_eq!(check_load(&shadow, buf, 8).unwrap(), Some(3));
}
