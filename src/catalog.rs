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

use crate::types::card_id::CardId;
use crate::types::scope::ListId;

/// Display data for a vocabulary card.
#[derive(Clone, PartialEq, Debug)]
pub struct VocabEntry {
    pub hanzi: String,
    pub pinyin: String,
    pub translation: String,
    pub translation_fr: String,
    pub audio: Option<String>,
    pub level: String,
}

pub trait ContentCatalog {
    /// Every card the learner has marked as learned, in catalog order.
    fn learned_cards(&self) -> Vec<CardId>;

    /// Look up a card's display data.
    fn resolve(&self, id: &CardId) -> Option<VocabEntry>;
}

pub trait ListManager {
    /// The members of a custom list, or `None` if no such list exists.
    fn list_card_ids(&self, list: &ListId) -> Option<Vec<CardId>>;
}
