#![allow(unsafe_code)]

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};

use crate::shadow::{
    allocator::{AllocatorPort, HeapAllocator},
    leaf::ShadowLeaf,
    map::ShadowMap,
    types::Address,
};

/// A [`ShadowMap`] that can sit in a `static` and be reached from several
/// execution contexts, e.g. an instrumented program and the signal or
/// interrupt handler that reports on it.
///
/// Every access runs inside a critical section. Re-entering the map from
/// inside [`Self::with_map`] panics instead of aliasing it.
pub struct SharedShadowMap<'d, A, L, P = HeapAllocator>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    map: Mutex<RefCell<ShadowMap<'d, A, L, P>>>,
}

impl<'d, A, L, P> SharedShadowMap<'d, A, L, P>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    pub fn new(map: ShadowMap<'d, A, L, P>) -> Self {
        Self {
            map: Mutex::new(RefCell::new(map)),
        }
    }

    /// Runs `f` with exclusive access to the map.
    pub fn with_map<R>(&self, f: impl FnOnce(&mut ShadowMap<'d, A, L, P>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.map.borrow_ref_mut(cs)))
    }

    /// # Safety
    /// Skips the critical section. The caller must guarantee that nothing
    /// else can reach the map for the duration of the call, for instance
    /// because it runs in a handler that cannot be preempted by another user
    /// of this map.
    pub unsafe fn with_map_unchecked<R>(
        &self,
        f: impl FnOnce(&mut ShadowMap<'d, A, L, P>) -> R,
    ) -> R {
        let cs = unsafe { CriticalSection::new() };
        f(&mut self.map.borrow_ref_mut(cs))
    }

    /// Exclusive access without a critical section; `&mut self` already
    /// rules out other users.
    pub fn get_mut(&mut self) -> &mut ShadowMap<'d, A, L, P> {
        self.map.get_mut().get_mut()
    }

    pub fn into_inner(self) -> ShadowMap<'d, A, L, P> {
        self.map.into_inner().into_inner()
    }
}

impl<A, L, P> core::fmt::Debug for SharedShadowMap<'_, A, L, P>
where
    A: Address,
    L: ShadowLeaf,
    P: AllocatorPort,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedShadowMap").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::{
        Partition,
        test_support::{ByteLeaf16, UNWRITTEN},
    };

    type Shared = SharedShadowMap<'static, u8, ByteLeaf16>;

    fn shared() -> Shared {
        SharedShadowMap::new(ShadowMap::new(
            Partition::new(8, &[4, 4]),
            &UNWRITTEN,
            HeapAllocator,
        ))
    }

    #[test]
    fn with_map_reads_and_writes() {
        let shared = shared();

        shared.with_map(|map| map.set(0x3C, b'x'));
        let value = shared.with_map(|map| map.get(0x3C));
        assert_eq!(value, b'x');

        let map = shared.into_inner();
        assert_eq!(map.get(0x3C), b'x');
        assert_eq!(map.stats().leaves, 1);
    }

    #[test]
    fn unchecked_access() {
        let shared = shared();
        unsafe { shared.with_map_unchecked(|map| map.fill(0x00, 0x20, b'z')) }.unwrap();
        assert_eq!(shared.with_map(|map| map.get(0x1F)), b'z');
    }

    #[test]
    fn get_mut_bypasses_lock() {
        let mut shared = shared();
        shared.get_mut().set(0x01, b'g');
        assert_eq!(shared.with_map(|map| map.get(0x01)), b'g');
    }

    #[test]
    fn usable_from_other_threads() {
        static SHARED: std::sync::OnceLock<Shared> = std::sync::OnceLock::new();
        let shared = SHARED.get_or_init(shared);

        std::thread::scope(|scope| {
            for t in 0..4u8 {
                scope.spawn(move || {
                    for i in 0..16u8 {
                        shared.with_map(|map| map.set(t * 64 + i, t));
                    }
                });
            }
        });

        for t in 0..4u8 {
            assert_eq!(shared.with_map(|map| map.get(t * 64 + 15)), t);
        }
    }
}
