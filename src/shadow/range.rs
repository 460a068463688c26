//! Batch operations over address ranges.
//!
//! Each operation walks its range one leaf run at a time, so the trie is
//! descended once per leaf instead of once per address.

#![allow(unsafe_code)]

use crate::shadow::{
    ShadowError, allocator::AllocatorPort, leaf::ShadowLeaf, map::ShadowMap, types::Address,
};

/// Validates `len` addresses starting at `start` against the address width.
///
/// Returns the last address of the range.
fn range_end<A: Address>(start: u64, len: u64) -> Result<u64, ShadowError> {
    if len == 0 {
        return Err(ShadowError::ZeroLength);
    }
    let last = start
        .checked_add(len - 1)
        .ok_or(ShadowError::OutOfBounds)?;
    if last > A::MAX {
        return Err(ShadowError::OutOfBounds);
    }
    Ok(last)
}

impl<A, L, P> ShadowMap<'_, A, L, P>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    /// Sets `len` consecutive addresses starting at `addr` to `value`.
    ///
    /// # Errors
    /// * [`ShadowError::ZeroLength`] - if `len` is 0
    /// * [`ShadowError::OutOfBounds`] - if the range passes the highest address
    pub fn fill(&mut self, addr: A, len: u64, value: L::Element) -> Result<(), ShadowError> {
        let mut addr = addr.to_u64();
        range_end::<A>(addr, len)?;

        let mut remaining = len;
        while remaining > 0 {
            let run = self.partition().contiguous_run(addr).min(remaining);
            let offset = self.partition().leaf_local_offset(addr);
            // SAFETY: trie-owned leaf, `&mut self` is held
            let leaf = unsafe { self.leaf_ptr_for_write(addr).as_mut() };
            for i in 0..run as usize {
                leaf.set_element(offset + i, value);
            }
            remaining -= run;
            addr = addr.wrapping_add(run);
        }
        Ok(())
    }

    /// Reads `out.len()` consecutive shadow values starting at `addr`.
    ///
    /// Never allocates: unwritten ranges read as the distinguished leaf.
    ///
    /// # Errors
    /// * [`ShadowError::ZeroLength`] - if `out` is empty
    /// * [`ShadowError::OutOfBounds`] - if the range passes the highest address
    pub fn read_into(&self, addr: A, out: &mut [L::Element]) -> Result<(), ShadowError> {
        let mut addr = addr.to_u64();
        range_end::<A>(addr, out.len() as u64)?;

        let mut done = 0;
        while done < out.len() {
            let run = self
                .partition()
                .contiguous_run(addr)
                .min((out.len() - done) as u64) as usize;
            let offset = self.partition().leaf_local_offset(addr);
            let leaf = self.leaf_for_read(addr);
            for (i, slot) in out[done..done + run].iter_mut().enumerate() {
                *slot = leaf.element(offset + i);
            }
            done += run;
            addr = addr.wrapping_add(run as u64);
        }
        Ok(())
    }

    /// Copies the shadow of `len` addresses from `src` to `dst`, the way a
    /// `memmove` of the underlying memory would.
    ///
    /// Overlapping ranges are handled. Source ranges that were never written
    /// are read from the distinguished leaf without being allocated;
    /// destination leaves are allocated as needed.
    ///
    /// # Errors
    /// * [`ShadowError::ZeroLength`] - if `len` is 0
    /// * [`ShadowError::OutOfBounds`] - if either range passes the highest address
    pub fn copy(&mut self, src: A, dst: A, len: u64) -> Result<(), ShadowError> {
        let (src, dst) = (src.to_u64(), dst.to_u64());
        let src_last = range_end::<A>(src, len)?;
        let dst_last = range_end::<A>(dst, len)?;
        if src == dst {
            return Ok(());
        }

        let mut remaining = len;
        if dst > src && dst - src < len {
            // destination overlaps the tail of the source: walk backwards
            let (mut s, mut d) = (src_last, dst_last);
            while remaining > 0 {
                let run = remaining
                    .min(self.partition().leaf_local_offset(s) as u64 + 1)
                    .min(self.partition().leaf_local_offset(d) as u64 + 1);
                self.copy_run(s - (run - 1), d - (run - 1), run as usize, true);
                remaining -= run;
                s = s.wrapping_sub(run);
                d = d.wrapping_sub(run);
            }
        } else {
            let (mut s, mut d) = (src, dst);
            while remaining > 0 {
                let run = remaining
                    .min(self.partition().contiguous_run(s))
                    .min(self.partition().contiguous_run(d));
                self.copy_run(s, d, run as usize, false);
                remaining -= run;
                s = s.wrapping_add(run);
                d = d.wrapping_add(run);
            }
        }
        Ok(())
    }

    /// Copies `len` elements where neither range crosses a leaf boundary.
    fn copy_run(&mut self, src: u64, dst: u64, len: usize, backwards: bool) {
        let src_offset = self.partition().leaf_local_offset(src);
        let dst_offset = self.partition().leaf_local_offset(dst);

        // Resolve the destination first: if both ranges share a leaf that does
        // not exist yet, the source lookup then finds the fresh leaf.
        let mut dst_leaf = self.leaf_ptr_for_write(dst);
        let src_leaf = self.leaf_ptr_for_read(src);

        let step = |i: usize, dst: &mut L, src: Option<&L>| {
            let value = match src {
                Some(src) => src.element(src_offset + i),
                None => dst.element(src_offset + i),
            };
            dst.set_element(dst_offset + i, value);
        };

        if src_leaf == dst_leaf {
            // SAFETY: trie-owned leaf, `&mut self` is held
            let leaf = unsafe { dst_leaf.as_mut() };
            if backwards {
                (0..len).rev().for_each(|i| step(i, leaf, None));
            } else {
                (0..len).for_each(|i| step(i, leaf, None));
            }
        } else {
            // SAFETY: distinct leaves, or the distinguished leaf which is
            // never part of the trie
            let (leaf, source) = unsafe { (dst_leaf.as_mut(), src_leaf.as_ref()) };
            (0..len).for_each(|i| step(i, leaf, Some(source)));
        }
    }
}
