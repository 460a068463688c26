use super::macros::{impl_view_read, impl_view_write, shadow_getter, shadow_setter};

/// Read-write view over shadow bytes inside one allocated leaf.
#[derive(Debug)]
pub struct RWSlice<'a>(&'a mut [u8]);

impl<'a> RWSlice<'a> {
    #[inline]
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self(bytes)
    }

    impl_view_read!();
    impl_view_write!();
}
