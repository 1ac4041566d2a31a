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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// Identifies a learner-defined custom list.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(String);

impl ListId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ListId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Display for ListId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The subset of cards under review.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum Scope {
    /// Every card the learner has learned.
    #[default]
    All,
    /// The members of one custom list.
    List(ListId),
}

impl Scope {
    pub fn from_list(list: Option<String>) -> Self {
        match list {
            Some(id) => Scope::List(ListId::new(id)),
            None => Scope::All,
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Scope::All => write!(f, "all learned cards"),
            Scope::List(id) => write!(f, "list {id}"),
        }
    }
}
