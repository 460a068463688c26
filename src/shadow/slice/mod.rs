//! Byte views over byte-shadow maps.
//!
//! Tools that keep one shadow byte per address (validity, taint, "accessed"
//! flags) usually want to inspect a whole access at once: all four bytes of a
//! 32-bit load, say. The views below hand out the shadow of such an access as
//! a slice with typed accessors, as long as it does not straddle two leaves.

mod macros;
mod ro;
mod rw;

pub use ro::ROSlice;
pub use rw::RWSlice;

use crate::shadow::{
    ShadowError, allocator::AllocatorPort, leaf::ArrayLeaf, map::ShadowMap, types::Address,
};

impl<A, P, const N: usize> ShadowMap<'_, A, ArrayLeaf<u8, N>, P>
where
    A: Address,
    P: AllocatorPort,
{
    /// Runs `f` on the `len` shadow bytes starting at `addr`. Never allocates.
    ///
    /// # Errors
    /// * [`ShadowError::ZeroLength`] - if `len` is 0
    /// * [`ShadowError::CrossesLeaf`] - if the range does not fit in one leaf
    pub fn with_ro_slice<F, R>(&self, addr: A, len: usize, f: F) -> Result<R, ShadowError>
    where
        F: FnOnce(ROSlice<'_>) -> R,
    {
        let offset = self.view_offset(addr, len)?;
        let leaf = self.read(addr);
        Ok(f(ROSlice::new(&leaf.0[offset..offset + len])))
    }

    /// Runs `f` on the `len` shadow bytes starting at `addr`, allocating the
    /// leaf if needed.
    ///
    /// # Errors
    /// * [`ShadowError::ZeroLength`] - if `len` is 0
    /// * [`ShadowError::CrossesLeaf`] - if the range does not fit in one leaf
    pub fn with_rw_slice<F, R>(&mut self, addr: A, len: usize, f: F) -> Result<R, ShadowError>
    where
        F: FnOnce(RWSlice<'_>) -> R,
    {
        let offset = self.view_offset(addr, len)?;
        let leaf = self.write_handle(addr);
        Ok(f(RWSlice::new(&mut leaf.0[offset..offset + len])))
    }

    fn view_offset(&self, addr: A, len: usize) -> Result<usize, ShadowError> {
        if len == 0 {
            return Err(ShadowError::ZeroLength);
        }
        if len as u64 > self.contiguous_run(addr) {
            return Err(ShadowError::CrossesLeaf);
        }
        Ok(self.leaf_local_offset(addr))
    }
}
