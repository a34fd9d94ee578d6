// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The ordered key-value store the index is written against.
//!
//! Backends must order keys byte-lexicographically and apply a committed
//! [`WriteBatch`] atomically: a reader sees either none or all of it.

mod memory;
#[cfg(feature = "rocksdb")]
mod rocks;

use bytes::Bytes;
pub use memory::{MemStore, MemWriteBatch};
#[cfg(feature = "rocksdb")]
pub use rocks::{RocksStore, RocksStoreConfig, RocksWriteBatch};

use crate::Result;

/// Mutations staged for one atomic commit.
pub trait WriteBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Removes every key in `[start, end)`.
    fn delete_range(&mut self, start: &[u8], end: &[u8]) -> Result<()>;

    /// Number of staged operations.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Point and batched reads plus atomic batch commit.
pub trait KvStore: Send + Sync {
    type Batch: WriteBatch;

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>>;

    /// Looks up every key. The result has one slot per key, in request
    /// order, all read from the same point in time.
    fn multi_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Bytes>>>;

    fn new_batch(&self) -> Self::Batch;

    fn commit(&self, batch: Self::Batch) -> Result<()>;
}
