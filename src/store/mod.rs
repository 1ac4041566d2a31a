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

pub mod memory;
pub mod sqlite;

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::record::CardRecord;

/// Scheduling state for every tracked card, keyed by card id.
pub type RecordMap = BTreeMap<CardId, CardRecord>;

/// The current version of the persisted payload.
pub const PAYLOAD_VERSION: u64 = 1;

pub trait RecordStore {
    /// Return the persisted records, or an empty map if there are none or the
    /// stored payload cannot be read.
    fn load(&self) -> RecordMap;

    /// Replace the persisted records with `records`.
    fn save(&mut self, records: &RecordMap) -> Fallible<()>;

    /// Delete every persisted record.
    fn clear(&mut self) -> Fallible<()>;
}

/// Return a copy of `records` containing only the keys in `allowed`.
pub fn prune(records: &RecordMap, allowed: &HashSet<CardId>) -> RecordMap {
    records
        .iter()
        .filter(|(id, _)| allowed.contains(*id))
        .map(|(id, record)| (id.clone(), *record))
        .collect()
}

#[derive(Serialize)]
struct Payload<'a> {
    version: u64,
    records: &'a RecordMap,
}

pub fn encode_payload(records: &RecordMap) -> Fallible<String> {
    let payload = Payload {
        version: PAYLOAD_VERSION,
        records,
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Parse a stored payload. Unversioned payloads are the legacy layout: a bare
/// object mapping card ids to records.
pub fn decode_payload(text: &str) -> RecordMap {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Discarding unparseable review state: {e}");
            return RecordMap::new();
        }
    };
    let mut object: Map<String, Value> = match value {
        Value::Object(object) => object,
        _ => {
            log::warn!("Discarding review state: payload is not an object.");
            return RecordMap::new();
        }
    };
    let version: Option<Value> = object.get("version").cloned();
    let records = match version {
        // A legacy map may hold a card whose id is `version`.
        None | Some(Value::Object(_)) => {
            log::debug!("Reading legacy unversioned review state.");
            object
        }
        Some(version) if version.as_u64() == Some(PAYLOAD_VERSION) => {
            match object.remove("records") {
                Some(Value::Object(records)) => records,
                _ => {
                    log::warn!("Discarding review state: missing record map.");
                    return RecordMap::new();
                }
            }
        }
        Some(version) => {
            log::warn!("Discarding review state with unsupported version {version}.");
            return RecordMap::new();
        }
    };
    decode_records(records)
}

fn decode_records(records: Map<String, Value>) -> RecordMap {
    let mut map = RecordMap::new();
    for (id, value) in records {
        if !value.is_object() {
            log::debug!("Dropping non-object record for card {id}.");
            continue;
        }
        match serde_json::from_value::<CardRecord>(value) {
            Ok(record) => {
                map.insert(CardId::new(id), record);
            }
            Err(e) => {
                log::debug!("Dropping malformed record for card {id}: {e}");
            }
        }
    }
    map
}
