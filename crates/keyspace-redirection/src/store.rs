use ahash::AHashMap;

use crate::selector::{RedirectionType, MAX_CONTIGUOUS_SIZE};

/// "No mapping". Shares its bit pattern with `-1i64`.
pub const NULL_ROW_KEY: u64 = u64::MAX;

/// Sparse stores allocate `1 << LOG_BLOCK_SIZE` entries at a time.
pub const LOG_BLOCK_SIZE: u32 = 10;
pub const BLOCK_SIZE: u64 = 1 << LOG_BLOCK_SIZE;

/// Indexed `u64 -> u64` storage underneath a [`RowRedirection`](crate::RowRedirection).
///
/// Absent entries read as [`NULL_ROW_KEY`], and writing [`NULL_ROW_KEY`] clears an entry.
pub trait BackingStore {
    /// Hint that keys below `capacity` are about to be written. Stores that do not address by
    /// key ignore it.
    fn ensure_capacity(&mut self, capacity: u64);

    fn get(&self, key: u64) -> u64;

    fn set(&mut self, key: u64, value: u64);

    /// Clears `key`, returning the previous value.
    fn remove(&mut self, key: u64) -> u64 {
        let prev = self.get(key);
        if prev != NULL_ROW_KEY {
            self.set(key, NULL_ROW_KEY);
        }
        prev
    }

    fn clear(&mut self);

    /// Number of keys with a mapping.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One slot per key in a contiguous vector. Suited to flat key spaces.
///
/// Keys at or above [`MAX_CONTIGUOUS_SIZE`] are refused with a warning.
#[derive(Clone, Debug, Default)]
pub struct DenseStore {
    values: Vec<u64>,
    len: usize,
}

impl DenseStore {
    pub fn with_capacity(capacity: u64) -> Self {
        let mut store = Self::default();
        store.ensure_capacity(capacity);
        store
    }
}

impl BackingStore for DenseStore {
    fn ensure_capacity(&mut self, capacity: u64) {
        let Ok(capacity) = usize::try_from(capacity.min(MAX_CONTIGUOUS_SIZE)) else {
            return;
        };
        if capacity > self.values.len() {
            self.values.resize(capacity, NULL_ROW_KEY);
        }
    }

    fn get(&self, key: u64) -> u64 {
        usize::try_from(key)
            .ok()
            .and_then(|idx| self.values.get(idx).copied())
            .unwrap_or(NULL_ROW_KEY)
    }

    fn set(&mut self, key: u64, value: u64) {
        let idx = match usize::try_from(key) {
            Ok(idx) if key < MAX_CONTIGUOUS_SIZE => idx,
            _ => {
                if value != NULL_ROW_KEY {
                    log::warn!("contiguous redirection store cannot address key {key}");
                }
                return;
            }
        };
        if idx >= self.values.len() {
            if value == NULL_ROW_KEY {
                return;
            }
            self.values.resize(idx + 1, NULL_ROW_KEY);
        }
        let slot = &mut self.values[idx];
        match (*slot == NULL_ROW_KEY, value == NULL_ROW_KEY) {
            (true, false) => self.len += 1,
            (false, true) => self.len -= 1,
            _ => {}
        }
        *slot = value;
    }

    fn clear(&mut self) {
        self.values.fill(NULL_ROW_KEY);
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[derive(Clone, Debug)]
struct Block {
    values: Box<[u64]>,
    used: usize,
}

impl Block {
    fn new() -> Self {
        Self {
            values: vec![NULL_ROW_KEY; BLOCK_SIZE as usize].into_boxed_slice(),
            used: 0,
        }
    }
}

fn split_key(key: u64) -> (u64, usize) {
    (key >> LOG_BLOCK_SIZE, (key & (BLOCK_SIZE - 1)) as usize)
}

/// Fixed-size blocks allocated on first write and dropped once empty.
#[derive(Clone, Debug, Default)]
pub struct SparseBlockStore {
    blocks: AHashMap<u64, Block>,
    len: usize,
}

impl SparseBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks currently allocated.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl BackingStore for SparseBlockStore {
    fn ensure_capacity(&mut self, _capacity: u64) {}

    fn get(&self, key: u64) -> u64 {
        let (block, offset) = split_key(key);
        self.blocks
            .get(&block)
            .map_or(NULL_ROW_KEY, |block| block.values[offset])
    }

    fn set(&mut self, key: u64, value: u64) {
        let (block_no, offset) = split_key(key);
        if value == NULL_ROW_KEY {
            let Some(block) = self.blocks.get_mut(&block_no) else {
                return;
            };
            if block.values[offset] == NULL_ROW_KEY {
                return;
            }
            block.values[offset] = NULL_ROW_KEY;
            block.used -= 1;
            self.len -= 1;
            if block.used == 0 {
                self.blocks.remove(&block_no);
            }
            return;
        }
        let block = self.blocks.entry(block_no).or_insert_with(Block::new);
        if block.values[offset] == NULL_ROW_KEY {
            block.used += 1;
            self.len += 1;
        }
        block.values[offset] = value;
    }

    fn clear(&mut self) {
        self.blocks.clear();
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[derive(Clone, Debug, Default)]
pub struct HashStore {
    map: AHashMap<u64, u64>,
}

impl HashStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: AHashMap::with_capacity(capacity),
        }
    }
}

impl BackingStore for HashStore {
    fn ensure_capacity(&mut self, _capacity: u64) {}

    fn get(&self, key: u64) -> u64 {
        self.map.get(&key).copied().unwrap_or(NULL_ROW_KEY)
    }

    fn set(&mut self, key: u64, value: u64) {
        if value == NULL_ROW_KEY {
            self.map.remove(&key);
        } else {
            self.map.insert(key, value);
        }
    }

    fn remove(&mut self, key: u64) -> u64 {
        self.map.remove(&key).unwrap_or(NULL_ROW_KEY)
    }

    fn clear(&mut self) {
        self.map.clear();
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// The store for a chosen [`RedirectionType`].
#[derive(Clone, Debug)]
pub enum RedirectionStorage {
    Contiguous(DenseStore),
    Sparse(SparseBlockStore),
    Hash(HashStore),
}

impl RedirectionStorage {
    pub fn for_type(ty: RedirectionType, initial_capacity: usize) -> Self {
        match ty {
            RedirectionType::Contiguous => {
                Self::Contiguous(DenseStore::with_capacity(initial_capacity as u64))
            }
            RedirectionType::Sparse => Self::Sparse(SparseBlockStore::new()),
            RedirectionType::Hash => Self::Hash(HashStore::with_capacity(initial_capacity)),
        }
    }

    pub fn redirection_type(&self) -> RedirectionType {
        match self {
            Self::Contiguous(_) => RedirectionType::Contiguous,
            Self::Sparse(_) => RedirectionType::Sparse,
            Self::Hash(_) => RedirectionType::Hash,
        }
    }

    fn inner(&self) -> &dyn BackingStore {
        match self {
            Self::Contiguous(store) => store,
            Self::Sparse(store) => store,
            Self::Hash(store) => store,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BackingStore {
        match self {
            Self::Contiguous(store) => store,
            Self::Sparse(store) => store,
            Self::Hash(store) => store,
        }
    }
}

impl BackingStore for RedirectionStorage {
    fn ensure_capacity(&mut self, capacity: u64) {
        self.inner_mut().ensure_capacity(capacity);
    }

    fn get(&self, key: u64) -> u64 {
        self.inner().get(key)
    }

    fn set(&mut self, key: u64, value: u64) {
        self.inner_mut().set(key, value);
    }

    fn remove(&mut self, key: u64) -> u64 {
        self.inner_mut().remove(key)
    }

    fn clear(&mut self) {
        self.inner_mut().clear();
    }

    fn len(&self) -> usize {
        self.inner().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exercise(store: &mut dyn BackingStore) {
        assert_eq!(store.get(5), NULL_ROW_KEY);
        store.set(5, 0);
        store.set(3000, 1);
        store.set(5, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(5), 2);
        assert_eq!(store.remove(5), 2);
        assert_eq!(store.remove(5), NULL_ROW_KEY);
        store.set(7, NULL_ROW_KEY);
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.get(3000), NULL_ROW_KEY);
    }

    #[test]
    fn every_store_follows_the_same_contract() {
        for ty in [
            RedirectionType::Contiguous,
            RedirectionType::Sparse,
            RedirectionType::Hash,
        ] {
            let mut storage = RedirectionStorage::for_type(ty, 16);
            assert_eq!(storage.redirection_type(), ty);
            exercise(&mut storage);
        }
    }

    #[test]
    fn sparse_blocks_are_released_when_empty() {
        let mut store = SparseBlockStore::new();
        store.set(0, 1);
        store.set(BLOCK_SIZE - 1, 2);
        store.set(BLOCK_SIZE, 3);
        assert_eq!(store.block_count(), 2);
        store.remove(BLOCK_SIZE);
        assert_eq!(store.block_count(), 1);
        store.remove(0);
        store.remove(BLOCK_SIZE - 1);
        assert_eq!(store.block_count(), 0);
    }

    #[test]
    fn dense_store_refuses_keys_beyond_contiguous_limit() {
        let mut store = DenseStore::with_capacity(4);
        store.set(MAX_CONTIGUOUS_SIZE, 1);
        store.set(u64::MAX - 1, 2);
        assert!(store.is_empty());
        assert_eq!(store.get(MAX_CONTIGUOUS_SIZE), NULL_ROW_KEY);
        store.set(3, 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn hash_store_ignores_key_bound_capacity() {
        let mut store = HashStore::with_capacity(4);
        store.ensure_capacity(1 << 50);
        store.set(1 << 50, 9);
        assert_eq!(store.get(1 << 50), 9);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn dense_store_grows_on_write() {
        let mut store = DenseStore::with_capacity(2);
        store.set(10, 4);
        assert_eq!(store.get(10), 4);
        assert_eq!(store.get(9), NULL_ROW_KEY);
        assert_eq!(store.get(u64::MAX - 1), NULL_ROW_KEY);
    }
}
