use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::shadow::{
    ShadowError, ShadowMap,
    leaf::ArrayLeaf,
    partition::Partition,
    test_support::CountingAllocator,
};

static ZEROED: ArrayLeaf<u8, 64> = ArrayLeaf::filled(0);

const LEAF_BITS: u32 = 6;

#[derive(Debug, Clone)]
enum Op {
    Set(u16, u8),
    Fill(u16, u64, u8),
    Copy(u16, u16, u64),
    Read(u16, usize),
}

fn addr_strategy() -> impl Strategy<Value = u16> + Clone {
    // Mostly a few hot pages so copies overlap and leaves get reused, with
    // the odd address anywhere, the top of the space included.
    prop_oneof![
        8 => 0x1F00u16..0x2100,
        1 => any::<u16>(),
        1 => 0xFF00u16..=0xFFFF,
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let addr = addr_strategy();
    let op = prop_oneof![
        40 => (addr.clone(), any::<u8>()).prop_map(|(a, v)| Op::Set(a, v)),
        20 => (addr.clone(), 1u64..200, any::<u8>()).prop_map(|(a, n, v)| Op::Fill(a, n, v)),
        25 => (addr.clone(), addr.clone(), 1u64..200).prop_map(|(s, d, n)| Op::Copy(s, d, n)),
        15 => (addr.clone(), 1usize..200).prop_map(|(a, n)| Op::Read(a, n)),
    ];
    prop::collection::vec(op, 0..=64)
}

/// Shadow values the model has seen written; everything else reads as 0.
struct Model {
    values: BTreeMap<u16, u8>,
    leaves: BTreeSet<u16>,
}

impl Model {
    fn get(&self, addr: u16) -> u8 {
        self.values.get(&addr).copied().unwrap_or(0)
    }

    fn set(&mut self, addr: u16, value: u8) {
        self.values.insert(addr, value);
        self.leaves.insert(addr >> LEAF_BITS);
    }

    fn fits(addr: u16, len: u64) -> bool {
        u64::from(addr) + len - 1 <= u64::from(u16::MAX)
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_model(ops in ops_strategy()) {
        let port = CountingAllocator::default();
        {
            let mut map: ShadowMap<u16, _, _> =
                ShadowMap::new(Partition::new(16, &[4, 6, 6]), &ZEROED, &port);
            let mut model = Model { values: BTreeMap::new(), leaves: BTreeSet::new() };

            for op in ops {
                match op {
                    Op::Set(addr, value) => {
                        map.set(addr, value);
                        model.set(addr, value);
                    }
                    Op::Fill(addr, len, value) => {
                        let result = map.fill(addr, len, value);
                        if Model::fits(addr, len) {
                            prop_assert_eq!(result, Ok(()));
                            for i in 0..len as u16 {
                                model.set(addr + i, value);
                            }
                        } else {
                            prop_assert_eq!(result, Err(ShadowError::OutOfBounds));
                        }
                    }
                    Op::Copy(src, dst, len) => {
                        let result = map.copy(src, dst, len);
                        if Model::fits(src, len) && Model::fits(dst, len) {
                            prop_assert_eq!(result, Ok(()));
                            if src != dst {
                                let moved: Vec<u8> =
                                    (0..len as u16).map(|i| model.get(src + i)).collect();
                                for (i, value) in moved.into_iter().enumerate() {
                                    model.set(dst + i as u16, value);
                                }
                            }
                        } else {
                            prop_assert_eq!(result, Err(ShadowError::OutOfBounds));
                        }
                    }
                    Op::Read(addr, len) => {
                        let mut out = std::vec![0xAAu8; len];
                        let result = map.read_into(addr, &mut out);
                        if Model::fits(addr, len as u64) {
                            prop_assert_eq!(result, Ok(()));
                            for (i, &value) in out.iter().enumerate() {
                                prop_assert_eq!(value, model.get(addr + i as u16));
                            }
                        } else {
                            prop_assert_eq!(result, Err(ShadowError::OutOfBounds));
                        }
                    }
                }

                prop_assert_eq!(map.stats().leaves, model.leaves.len());
            }

            for (&addr, &value) in &model.values {
                prop_assert_eq!(map.get(addr), value);
            }
            for leaf in 0..=(u16::MAX >> LEAF_BITS) {
                prop_assert_eq!(map.is_written(leaf << LEAF_BITS), model.leaves.contains(&leaf));
            }
            prop_assert_eq!(map.stats().nodes(), port.allocations());
        }
        prop_assert_eq!(port.live_blocks(), 0);
        prop_assert_eq!(port.live_bytes(), 0);
    }

    #[test]
    fn prop_run_and_offset_partition_the_leaf(addr in any::<u64>(), dims in prop::sample::select(vec![
        vec![32u32, 32],
        vec![20, 20, 24],
        vec![16, 16, 16, 16],
        vec![1, 31, 20, 12],
    ])) {
        let partition = Partition::new(64, &dims);
        let offset = partition.leaf_local_offset(addr) as u64;
        prop_assert_eq!(offset + partition.contiguous_run(addr), partition.leaf_size());
        prop_assert_eq!(offset, addr & (partition.leaf_size() - 1));
    }
}
