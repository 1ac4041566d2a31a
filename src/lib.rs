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

pub mod catalog;
pub mod cli;
pub mod clock;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod deck;
pub mod error;
#[cfg(test)]
mod helper;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;

pub use error::ErrorReport;
pub use error::Fallible;
pub use error::fail;
pub use queue::ReviewQueue;
pub use session::RateOutcome;
pub use session::Session;
pub use store::RecordMap;
pub use store::RecordStore;
pub use types::card_id::CardId;
pub use types::rating::Rating;
pub use types::record::CardRecord;
pub use types::scope::ListId;
pub use types::scope::Scope;
pub use types::timestamp::Timestamp;
