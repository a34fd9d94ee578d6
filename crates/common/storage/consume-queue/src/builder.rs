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

use std::sync::Arc;

use crate::{ConsumeQueueConfig, ConsumeQueueTable, store::KvStore};

pub struct ConsumeQueueTableBuilder<S> {
    store:  Arc<S>,
    config: ConsumeQueueConfig,
}

impl<S: KvStore> ConsumeQueueTableBuilder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            config: ConsumeQueueConfig::default(),
        }
    }

    pub fn config(mut self, config: ConsumeQueueConfig) -> Self {
        self.config = config;
        self
    }

    pub fn enable_search_log(mut self, enable: bool) -> Self {
        self.config.enable_search_log = enable;
        self
    }

    pub fn max_range_count(mut self, count: usize) -> Self {
        self.config.max_range_count = count;
        self
    }

    pub fn build(self) -> ConsumeQueueTable<S> { ConsumeQueueTable::new(self.store, self.config) }
}
