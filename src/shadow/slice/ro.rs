use super::macros::{impl_view_read, shadow_getter};

/// Read-only view over shadow bytes inside one leaf.
///
/// May alias the distinguished leaf, so it offers no mutation.
#[derive(Debug, Clone, Copy)]
pub struct ROSlice<'a>(&'a [u8]);

impl<'a> ROSlice<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    impl_view_read!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads() {
        let bytes = [0x78, 0x56, 0x34, 0x12, 0xF0, 0xDE, 0xBC, 0x9A, 0xFF];
        let view = ROSlice::new(&bytes);

        assert_eq!(view.read_u32_le_at(0), 0x1234_5678);
        assert_eq!(view.read_u32_be_at(0), 0x7856_3412);
        assert_eq!(view.read_u16_le_at(1), 0x3456);
        assert_eq!(view.read_u64_le_at(0), 0x9ABC_DEF0_1234_5678);
        assert_eq!(view.read_i8_at(8), -1);
        assert_eq!(view.read_i16_be_at(7), -0x6501);
    }

    #[test]
    fn scans() {
        let bytes = *b"uuuxu";
        let view = ROSlice::new(&bytes);

        assert!(!view.all_eq(b'u'));
        assert_eq!(view.position_ne(b'u'), Some(3));
        assert_eq!(ROSlice::new(&bytes[..3]).position_ne(b'u'), None);
        assert!(ROSlice::new(&bytes[..3]).all_eq(b'u'));
    }

    #[test]
    fn copy_out() {
        let bytes = [1, 2, 3];
        let mut dest = [0u8; 3];
        ROSlice::new(&bytes).copy_to_slice(&mut dest);
        assert_eq!(dest, bytes);
    }

    #[test]
    #[should_panic(expected = "read out of bounds")]
    fn read_past_end() {
        let bytes = [0u8; 4];
        ROSlice::new(&bytes).read_u32_le_at(1);
    }

    #[test]
    #[should_panic]
    fn copy_out_length_mismatch() {
        let bytes = [0u8; 4];
        let mut dest = [0u8; 3];
        ROSlice::new(&bytes).copy_to_slice(&mut dest);
    }
}
