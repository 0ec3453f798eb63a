//! Opaque ID newtypes for architecture entities.
//!
//! Each ID is a thin `u32` index into the owning [`Architecture`](crate::Architecture)
//! table and is `Copy`, `Hash`, and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize`, for table lookups.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Position of a grid layout in the architecture's declaration order.
    LayoutId
);

define_id!(
    /// Position of a physical tile type in the tile catalog.
    TileTypeId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn id_roundtrip() {
        let id = LayoutId::from_raw(3);
        assert_eq!(id.as_raw(), 3);
        assert_eq!(id.index(), 3);
    }

    #[test]
    fn ids_order_by_index() {
        let mut map = BTreeMap::new();
        map.insert(LayoutId::from_raw(2), "b");
        map.insert(LayoutId::from_raw(0), "a");
        let keys: Vec<_> = map.keys().map(|k| k.as_raw()).collect();
        assert_eq!(keys, vec![0, 2]);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = TileTypeId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let restored: TileTypeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
