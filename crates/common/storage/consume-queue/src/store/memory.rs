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

use std::{collections::BTreeMap, ops::Bound};

use bytes::Bytes;
use parking_lot::RwLock;

use super::{KvStore, WriteBatch};
use crate::Result;

#[derive(Debug, Clone)]
enum BatchOp {
    Put { key: Bytes, value: Bytes },
    DeleteRange { start: Bytes, end: Bytes },
}

/// Write batch for [`MemStore`]. Operations apply in staging order.
#[derive(Debug, Default, Clone)]
pub struct MemWriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch for MemWriteBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ops.push(BatchOp::Put {
            key:   Bytes::copy_from_slice(key),
            value: Bytes::copy_from_slice(value),
        });
        Ok(())
    }

    fn delete_range(&mut self, start: &[u8], end: &[u8]) -> Result<()> {
        self.ops.push(BatchOp::DeleteRange {
            start: Bytes::copy_from_slice(start),
            end:   Bytes::copy_from_slice(end),
        });
        Ok(())
    }

    fn len(&self) -> usize { self.ops.len() }
}

/// Ordered in-memory store.
///
/// Commits hold the write lock for the whole batch and `multi_get` holds one
/// read lock for all keys, so readers never observe half a batch.
#[derive(Debug, Default)]
pub struct MemStore {
    entries: RwLock<BTreeMap<Bytes, Bytes>>,
}

impl MemStore {
    pub fn new() -> Self { Self::default() }

    /// Number of stored keys.
    pub fn len(&self) -> usize { self.entries.read().len() }

    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    /// Snapshot of every stored key, in order.
    pub fn keys(&self) -> Vec<Bytes> { self.entries.read().keys().cloned().collect() }
}

fn delete_range(entries: &mut BTreeMap<Bytes, Bytes>, start: &[u8], end: &[u8]) {
    if start >= end {
        return;
    }
    let doomed: Vec<Bytes> = entries
        .range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)))
        .map(|(k, _)| k.clone())
        .collect();
    for key in doomed {
        entries.remove(&key);
    }
}

impl KvStore for MemStore {
    type Batch = MemWriteBatch;

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> { Ok(self.entries.read().get(key).cloned()) }

    fn multi_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Bytes>>> {
        let entries = self.entries.read();
        Ok(keys
            .iter()
            .map(|key| entries.get(key.as_slice()).cloned())
            .collect())
    }

    fn new_batch(&self) -> Self::Batch { MemWriteBatch::default() }

    fn commit(&self, batch: Self::Batch) -> Result<()> {
        let mut entries = self.entries.write();
        for op in batch.ops {
            match op {
                BatchOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                BatchOp::DeleteRange { start, end } => delete_range(&mut entries, &start, &end),
            }
        }
        Ok(())
    }
}
