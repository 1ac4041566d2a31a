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

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;

use crate::error::Fallible;
use crate::store::RecordMap;
use crate::store::RecordStore;
use crate::store::decode_payload;
use crate::store::encode_payload;
use crate::types::timestamp::Timestamp;

/// The row the record map is stored under.
const STATE_KEY: &str = "srs_state";

/// A record store backed by a SQLite database. The record map lives in a
/// single row of a key/value table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(database_path: &str) -> Fallible<Self> {
        let conn = Connection::open(database_path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Fallible<Self> {
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating review state schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    fn read_payload(&self) -> Fallible<Option<String>> {
        let sql = "select payload from review_state where state_key = ?;";
        let payload: Option<String> = self
            .conn
            .query_row(sql, [STATE_KEY], |row| row.get(0))
            .optional()?;
        Ok(payload)
    }

    /// When the record map was last saved, if ever.
    pub fn saved_at(&self) -> Fallible<Option<Timestamp>> {
        let sql = "select saved_at from review_state where state_key = ?;";
        let saved_at: Option<Timestamp> = self
            .conn
            .query_row(sql, [STATE_KEY], |row| row.get(0))
            .optional()?;
        Ok(saved_at)
    }
}

impl RecordStore for SqliteStore {
    fn load(&self) -> RecordMap {
        match self.read_payload() {
            Ok(Some(payload)) => decode_payload(&payload),
            Ok(None) => RecordMap::new(),
            Err(e) => {
                log::warn!("Failed to read review state, starting empty: {e}");
                RecordMap::new()
            }
        }
    }

    fn save(&mut self, records: &RecordMap) -> Fallible<()> {
        let payload = encode_payload(records)?;
        let tx = self.conn.transaction()?;
        let sql = "insert into review_state (state_key, payload, saved_at) values (?, ?, ?) on conflict (state_key) do update set payload = excluded.payload, saved_at = excluded.saved_at;";
        tx.execute(sql, (STATE_KEY, &payload, Timestamp::now()))?;
        tx.commit()?;
        log::debug!("Saved {} card records.", records.len());
        Ok(())
    }

    fn clear(&mut self) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        tx.execute("delete from review_state where state_key = ?;", [STATE_KEY])?;
        tx.commit()?;
        Ok(())
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["review_state"], |row| row.get(0))?;
    Ok(count > 0)
}
