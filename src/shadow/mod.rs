pub mod allocator;
pub mod builder;
pub mod error;
pub mod leaf;
pub mod map;
pub(crate) mod node;
pub mod partition;
mod range;
pub mod shared;
pub mod slice;
pub(crate) mod trie;
pub mod types;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod test_support;

pub use allocator::{AllocatorPort, GlobalPort, HeapAllocator};
pub use builder::ShadowMapBuilder;
pub use error::{PartitionError, ShadowError};
pub use leaf::{ArrayLeaf, ShadowLeaf};
pub use map::ShadowMap;
pub use partition::{MAX_DIMENSION_BITS, MAX_LEVELS, Partition};
pub use shared::SharedShadowMap;
pub use slice::{ROSlice, RWSlice};
pub use types::{Address, MapStats};

pub mod prelude {
    pub use super::{
        Address, AllocatorPort, ArrayLeaf, GlobalPort, HeapAllocator, MapStats, Partition,
        PartitionError, ROSlice, RWSlice, ShadowError, ShadowLeaf, ShadowMap, ShadowMapBuilder,
        SharedShadowMap,
    };
}
