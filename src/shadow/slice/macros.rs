/// Little- and big-endian getters for one integer type.
macro_rules! shadow_getter {
    ($type:ty) => {
        paste::paste! {
            #[doc = "Little-endian `" $type "` stored at `offset`."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if the value does not fit before the end of the view."]
            #[inline]
            pub fn [<read_ $type _le_at>](&self, offset: usize) -> $type {
                <$type>::from_le_bytes(self.window::<{ core::mem::size_of::<$type>() }>(offset))
            }

            #[doc = "Big-endian `" $type "` stored at `offset`."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if the value does not fit before the end of the view."]
            #[inline]
            pub fn [<read_ $type _be_at>](&self, offset: usize) -> $type {
                <$type>::from_be_bytes(self.window::<{ core::mem::size_of::<$type>() }>(offset))
            }
        }
    };
}

/// Little- and big-endian setters for one integer type.
macro_rules! shadow_setter {
    ($type:ty) => {
        paste::paste! {
            #[doc = "Stores `value` as a little-endian `" $type "` at `offset`."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if the value does not fit before the end of the view."]
            #[inline]
            pub fn [<write_ $type _le_at>](&mut self, offset: usize, value: $type) {
                self.window_mut(offset, core::mem::size_of::<$type>())
                    .copy_from_slice(&value.to_le_bytes());
            }

            #[doc = "Stores `value` as a big-endian `" $type "` at `offset`."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = "Panics if the value does not fit before the end of the view."]
            #[inline]
            pub fn [<write_ $type _be_at>](&mut self, offset: usize, value: $type) {
                self.window_mut(offset, core::mem::size_of::<$type>())
                    .copy_from_slice(&value.to_be_bytes());
            }
        }
    };
}

/// Read side shared by both views: byte access, typed getters, scans.
macro_rules! impl_view_read {
    () => {
        /// Number of shadow bytes in the view.
        #[inline]
        pub fn len(&self) -> usize {
            self.0.len()
        }

        /// Views are never empty when handed out by a map.
        #[inline]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        #[inline]
        pub fn as_bytes(&self) -> &[u8] {
            &self.0[..]
        }

        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn read_u8_at(&self, offset: usize) -> u8 {
            self.0[offset]
        }

        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn read_i8_at(&self, offset: usize) -> i8 {
            self.0[offset] as i8
        }

        shadow_getter!(u16);
        shadow_getter!(i16);
        shadow_getter!(u32);
        shadow_getter!(i32);
        shadow_getter!(u64);
        shadow_getter!(i64);

        /// Copies the whole view into `dest`.
        ///
        /// # Panics
        /// Panics if `dest.len() != len()`.
        #[inline]
        pub fn copy_to_slice(&self, dest: &mut [u8]) {
            dest.copy_from_slice(&self.0[..]);
        }

        /// True if every shadow byte in the view equals `byte`.
        #[inline]
        pub fn all_eq(&self, byte: u8) -> bool {
            self.0.iter().all(|&b| b == byte)
        }

        /// Offset of the first shadow byte that differs from `byte`.
        ///
        /// A checker typically passes its "valid" state and reports the
        /// returned offset.
        #[inline]
        pub fn position_ne(&self, byte: u8) -> Option<usize> {
            self.0.iter().position(|&b| b != byte)
        }

        #[inline]
        fn window<const SIZE: usize>(&self, offset: usize) -> [u8; SIZE] {
            assert!(
                offset.checked_add(SIZE).is_some_and(|end| end <= self.0.len()),
                "read out of bounds: offset {} + size {} > len {}",
                offset,
                SIZE,
                self.0.len()
            );
            let mut bytes = [0u8; SIZE];
            bytes.copy_from_slice(&self.0[offset..offset + SIZE]);
            bytes
        }
    };
}

/// Write side of [`RWSlice`](super::RWSlice).
macro_rules! impl_view_write {
    () => {
        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn write_u8_at(&mut self, offset: usize, value: u8) {
            self.0[offset] = value;
        }

        /// # Panics
        /// Panics if `offset >= len()`.
        #[inline]
        pub fn write_i8_at(&mut self, offset: usize, value: i8) {
            self.0[offset] = value as u8;
        }

        shadow_setter!(u16);
        shadow_setter!(i16);
        shadow_setter!(u32);
        shadow_setter!(i32);
        shadow_setter!(u64);
        shadow_setter!(i64);

        /// Sets every shadow byte in the view to `value`.
        #[inline]
        pub fn fill(&mut self, value: u8) {
            self.0.fill(value);
        }

        /// Overwrites the view from `src`.
        ///
        /// # Panics
        /// Panics if `src.len() != len()`.
        #[inline]
        pub fn copy_from_slice(&mut self, src: &[u8]) {
            self.0.copy_from_slice(src);
        }

        #[inline]
        pub fn as_bytes_mut(&mut self) -> &mut [u8] {
            &mut self.0[..]
        }

        #[inline]
        fn window_mut(&mut self, offset: usize, size: usize) -> &mut [u8] {
            let len = self.0.len();
            assert!(
                offset.checked_add(size).is_some_and(|end| end <= len),
                "write out of bounds: offset {} + size {} > len {}",
                offset,
                size,
                len
            );
            &mut self.0[offset..offset + size]
        }
    };
}

pub(super) use impl_view_read;
pub(super) use impl_view_write;
pub(super) use shadow_getter;
pub(super) use shadow_setter;
