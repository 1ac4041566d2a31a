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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::catalog::VocabEntry;
use crate::error::Fallible;
use crate::error::fail;

/// The name of the optional config file in a collection directory.
pub const CONFIG_FILE: &str = "vocabreview.toml";

#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the review database, relative to the collection directory.
    pub database: PathBuf,
    /// The language translations are shown in.
    pub language: Language,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("vocabreview.db"),
            language: Language::En,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// Pick the translation to show. French falls back to English when a card
    /// has no French translation.
    pub fn translation<'a>(&self, entry: &'a VocabEntry) -> &'a str {
        match self {
            Language::Fr if !entry.translation_fr.is_empty() => &entry.translation_fr,
            _ => &entry.translation,
        }
    }
}

impl Config {
    /// Load the config file from `directory`, or the defaults if there is none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config file, using defaults.");
            return Ok(Self::default());
        }
        let contents = read_to_string(&path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Fallible<Self> {
        match toml::from_str(contents) {
            Ok(config) => Ok(config),
            Err(e) => fail(format!("invalid config file: {e}")),
        }
    }
}
