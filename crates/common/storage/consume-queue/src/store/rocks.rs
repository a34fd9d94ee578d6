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

use std::path::PathBuf;

use bytes::Bytes;
use rocksdb::{DB, Options};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracing::info;

use super::{KvStore, WriteBatch};
use crate::{Result, error::StoreResultExt};

/// Options for opening a [`RocksStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(default)]
pub struct RocksStoreConfig {
    #[default(_code = "PathBuf::from(\"./consume_queue\")")]
    pub path:              PathBuf,
    #[default = true]
    pub create_if_missing: bool,
    /// `-1` keeps every table file open.
    #[default(-1)]
    pub max_open_files:    i32,
}

/// Write batch for [`RocksStore`].
pub struct RocksWriteBatch {
    inner: rocksdb::WriteBatch,
}

impl WriteBatch for RocksWriteBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.put(key, value);
        Ok(())
    }

    fn delete_range(&mut self, start: &[u8], end: &[u8]) -> Result<()> {
        self.inner.delete_range(start, end);
        Ok(())
    }

    fn len(&self) -> usize { self.inner.len() }
}

/// Store over the default column family of a RocksDB instance.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    pub fn open(config: &RocksStoreConfig) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.set_max_open_files(config.max_open_files);

        let db = DB::open(&opts, &config.path).store_context("open")?;
        info!(path = %config.path.display(), "Opened consume queue store");
        Ok(Self { db })
    }
}

impl KvStore for RocksStore {
    type Batch = RocksWriteBatch;

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        Ok(self.db.get(key).store_context("get")?.map(Bytes::from))
    }

    fn multi_get(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Bytes>>> {
        self.db
            .multi_get(keys)
            .into_iter()
            .map(|value| Ok(value.store_context("multi_get")?.map(Bytes::from)))
            .collect()
    }

    fn new_batch(&self) -> Self::Batch {
        RocksWriteBatch {
            inner: rocksdb::WriteBatch::default(),
        }
    }

    fn commit(&self, batch: Self::Batch) -> Result<()> { self.db.write(batch.inner).store_context("commit") }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn open(dir: &TempDir) -> RocksStore {
        RocksStore::open(&RocksStoreConfig {
            path: dir.path().join("cq"),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rocks_put_get_delete_range() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);

        let mut batch = store.new_batch();
        for key in [b"a", b"b", b"c"] {
            batch.put(key, b"v").unwrap();
        }
        assert_eq!(batch.len(), 3);
        store.commit(batch).unwrap();

        let values = store
            .multi_get(&[b"a".to_vec(), b"x".to_vec(), b"c".to_vec()])
            .unwrap();
        assert_eq!(values.len(), 3);
        assert!(values[1].is_none());

        let mut batch = store.new_batch();
        batch.delete_range(b"a", b"c").unwrap();
        store.commit(batch).unwrap();

        assert!(store.get(b"a").unwrap().is_none());
        assert!(store.get(b"b").unwrap().is_none());
        assert_eq!(store.get(b"c").unwrap(), Some(Bytes::from_static(b"v")));
    }

    #[test]
    fn test_rocks_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        {
            let store = open(&dir);
            let mut batch = store.new_batch();
            batch.put(b"k", b"v").unwrap();
            store.commit(batch).unwrap();
        }

        let store = open(&dir);
        assert!(store.get(b"k").unwrap().is_some());
    }

    #[test]
    fn test_missing_store_fails_without_create() {
        let dir = TempDir::new().unwrap();
        let result = RocksStore::open(&RocksStoreConfig {
            path: dir.path().join("absent"),
            create_if_missing: false,
            ..Default::default()
        });
        assert!(matches!(
            result,
            Err(crate::ConsumeQueueError::StoreUnavailable { op: "open", .. })
        ));
    }
}
