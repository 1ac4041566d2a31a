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

use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::catalog::ContentCatalog;
use crate::catalog::ListManager;
use crate::catalog::VocabEntry;
use crate::config::CONFIG_FILE;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::card_id::CardId;
use crate::types::scope::ListId;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeckFile {
    #[serde(default)]
    cards: Vec<CardEntry>,
    #[serde(default)]
    lists: Vec<ListEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CardEntry {
    id: String,
    hanzi: String,
    pinyin: String,
    translation: String,
    #[serde(default)]
    translation_fr: String,
    audio: Option<String>,
    #[serde(default)]
    level: String,
    #[serde(default = "learned_by_default")]
    learned: bool,
}

fn learned_by_default() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListEntry {
    id: String,
    name: String,
    #[serde(default)]
    cards: Vec<String>,
}

pub struct DeckCard {
    pub id: CardId,
    pub entry: VocabEntry,
    /// Whether the card belongs to the "all learned cards" scope.
    pub learned: bool,
    /// The file the card was read from.
    pub file_path: PathBuf,
}

pub struct CustomList {
    pub id: ListId,
    pub name: String,
    pub cards: Vec<CardId>,
}

pub struct Deck {
    cards: Vec<DeckCard>,
    index: HashMap<CardId, usize>,
    lists: Vec<CustomList>,
}

impl Deck {
    /// Read every `.toml` file under `directory`, except the config file.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let mut deck = Self::empty();
        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "toml") {
                continue;
            }
            if path.file_name().is_some_and(|name| name == CONFIG_FILE) {
                continue;
            }
            let contents = read_to_string(path)?;
            deck.add_file(path, &contents)?;
        }
        log::debug!(
            "Loaded {} cards and {} lists.",
            deck.cards.len(),
            deck.lists.len()
        );
        Ok(deck)
    }

    pub fn empty() -> Self {
        Self {
            cards: Vec::new(),
            index: HashMap::new(),
            lists: Vec::new(),
        }
    }

    /// Parse one deck file and add its cards and lists.
    pub fn add_file(&mut self, path: &Path, contents: &str) -> Fallible<()> {
        let file: DeckFile = match toml::from_str(contents) {
            Ok(file) => file,
            Err(e) => return fail(format!("failed to parse {}: {e}", path.display())),
        };
        for card in file.cards {
            let id = CardId::new(card.id);
            if let Some(existing) = self.card(&id) {
                return fail(format!(
                    "duplicate card id {id} in {} (first defined in {})",
                    path.display(),
                    existing.file_path.display()
                ));
            }
            self.index.insert(id.clone(), self.cards.len());
            self.cards.push(DeckCard {
                id,
                entry: VocabEntry {
                    hanzi: card.hanzi,
                    pinyin: card.pinyin,
                    translation: card.translation,
                    translation_fr: card.translation_fr,
                    audio: card.audio,
                    level: card.level,
                },
                learned: card.learned,
                file_path: path.to_path_buf(),
            });
        }
        for list in file.lists {
            let id = ListId::new(list.id);
            if self.lists.iter().any(|existing| existing.id == id) {
                return fail(format!(
                    "duplicate list id {id} in {}",
                    path.display()
                ));
            }
            self.lists.push(CustomList {
                id,
                name: list.name,
                cards: list.cards.into_iter().map(CardId::new).collect(),
            });
        }
        Ok(())
    }

    /// Check that every list member is a known card.
    pub fn validate(&self) -> Fallible<()> {
        for list in &self.lists {
            let mut seen: HashSet<&CardId> = HashSet::new();
            for id in &list.cards {
                if !self.index.contains_key(id) {
                    return fail(format!("list {} references unknown card {id}", list.id));
                }
                if !seen.insert(id) {
                    return fail(format!("list {} contains card {id} twice", list.id));
                }
            }
        }
        Ok(())
    }

    pub fn cards(&self) -> &[DeckCard] {
        &self.cards
    }

    pub fn lists(&self) -> &[CustomList] {
        &self.lists
    }

    pub fn card(&self, id: &CardId) -> Option<&DeckCard> {
        self.index.get(id).map(|i| &self.cards[*i])
    }
}

impl ContentCatalog for Deck {
    fn learned_cards(&self) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|card| card.learned)
            .map(|card| card.id.clone())
            .collect()
    }

    fn resolve(&self, id: &CardId) -> Option<VocabEntry> {
        self.card(id).map(|card| card.entry.clone())
    }
}

impl ListManager for Deck {
    fn list_card_ids(&self, list: &ListId) -> Option<Vec<CardId>> {
        self.lists
            .iter()
            .find(|candidate| &candidate.id == list)
            .map(|found| found.cards.clone())
    }
}
