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

use clap::Parser;

use crate::cmd::check::check_collection;
use crate::cmd::reset::reset_progress;
use crate::cmd::review::review;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Review the cards that are due.
    Review {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Review only the members of this custom list.
        #[arg(long)]
        list: Option<String>,
    },
    /// Print review statistics.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Only count the members of this custom list.
        #[arg(long)]
        list: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Check that the collection's config, decks, and lists are valid.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Delete all review progress.
    Reset {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Review { directory, list } => review(directory, list),
        Command::Stats {
            directory,
            list,
            format,
        } => print_stats(directory, list, format),
        Command::Check { directory } => check_collection(directory),
        Command::Reset { directory } => reset_progress(directory),
    }
}
