// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::Fallible;
use crate::error::fail;
use crate::store::RecordMap;
use crate::store::RecordStore;
use crate::store::decode_payload;
use crate::store::encode_payload;

/// A record store that keeps the serialized payload in memory. Writes can be
/// made to fail, to exercise the session's recovery path.
#[derive(Default)]
pub struct MemoryStore {
    payload: Option<String>,
    failing_writes: usize,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `payload`, verbatim.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            ..Self::default()
        }
    }

    /// Make the next `count` writes fail.
    pub fn fail_next_writes(&mut self, count: usize) {
        self.failing_writes = count;
    }

    /// The number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    fn write(&mut self, payload: Option<String>) -> Fallible<()> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return fail("simulated write failure");
        }
        self.payload = payload;
        self.writes += 1;
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> RecordMap {
        match &self.payload {
            Some(payload) => decode_payload(payload),
            None => RecordMap::new(),
        }
    }

    fn save(&mut self, records: &RecordMap) -> Fallible<()> {
        let payload = encode_payload(records)?;
        self.write(Some(payload))
    }

    fn clear(&mut self) -> Fallible<()> {
        self.write(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card_id::CardId;
    use crate::types::record::CardRecord;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_failing_writes_keep_previous_payload() -> Fallible<()> {
        let mut store = MemoryStore::new();
        let mut map = RecordMap::new();
        map.insert(CardId::from("a"), CardRecord::unseen(Timestamp::EPOCH));
        store.save(&map)?;
        store.fail_next_writes(1);
        assert!(store.save(&RecordMap::new()).is_err());
        assert_eq!(store.load(), map);
        store.save(&RecordMap::new())?;
        assert!(store.load().is_empty());
        assert_eq!(store.writes(), 2);
        Ok(())
    }

    #[test]
    fn test_malformed_payload() {
        let store = MemoryStore::with_payload("{\"version\": \"one\"");
        assert!(store.load().is_empty());
    }
}
