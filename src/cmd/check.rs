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

use crate::collection::Collection;
use crate::deck::Deck;
use crate::error::Fallible;

pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    println!("{}", summary(&coll.deck));
    Ok(())
}

fn summary(deck: &Deck) -> String {
    format!(
        "ok: {} cards, {} lists",
        deck.cards().len(),
        deck.lists().len()
    )
}

#[cfg(test)]
mod tests {
    use super::check_collection;
    use super::summary;
    use crate::collection::Collection;
    use crate::helper::create_tmp_copy_of_test_directory;

    #[test]
    fn test_non_existent_directory() {
        assert!(check_collection(Some("./derpherp".to_string())).is_err());
    }

    #[test]
    fn test_directory() {
        let directory = create_tmp_copy_of_test_directory().unwrap();
        assert!(check_collection(Some(directory)).is_ok());
    }

    #[test]
    fn test_broken_list() {
        let directory = create_tmp_copy_of_test_directory().unwrap();
        std::fs::write(
            format!("{directory}/broken.toml"),
            "[[lists]]\nid = \"broken\"\nname = \"Broken\"\ncards = [\"hsk9-404\"]\n",
        )
        .unwrap();
        assert!(check_collection(Some(directory)).is_err());
    }

    #[test]
    fn test_summary() {
        let directory = create_tmp_copy_of_test_directory().unwrap();
        let coll = Collection::new(Some(directory)).unwrap();
        assert_eq!(summary(&coll.deck), "ok: 6 cards, 2 lists");
    }
}
