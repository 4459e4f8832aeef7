// Copyright 2025 The secquest Authors
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

use std::process::exit;

use clap::Parser;
use clap::Subcommand;
use secquest_core::error::Fallible;
use secquest_core::types::settings::SettingsPatch;
use secquest_core::types::timestamp::Timestamp;
use tokio::spawn;

use crate::cmd::check::check_collection;
use crate::cmd::due::list_due;
use crate::cmd::play::server::ServerConfig;
use crate::cmd::play::server::start_server;
use crate::cmd::save::export_save;
use crate::cmd::save::import_save;
use crate::cmd::save::reset;
use crate::cmd::settings::update_settings;
use crate::cmd::shop::buy;
use crate::cmd::shop::equip;
use crate::cmd::shop::list_cosmetics;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Play through a web interface.
    Play {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
    },
    /// Check the question packs of a collection for content errors.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Print player statistics.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// List the questions due for review in the forge.
    Due {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Export the saved progress as JSON.
    Export {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Optional path to the output file. By default, the output is printed to stdout.
        #[arg(long)]
        output: Option<String>,
    },
    /// Import progress from an exported save file.
    Import {
        /// Path to the save file.
        file: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Erase the profile, mastery, and run history. Settings are kept.
    Reset {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },
    /// Commands relating to the cosmetic shop.
    Shop {
        #[command(subcommand)]
        command: ShopCommand,
    },
    /// Change game settings. Prints the settings after the change.
    Settings {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Number of questions drawn into a forge run.
        #[arg(long)]
        forge_size: Option<usize>,
        /// Whether sound effects are enabled.
        #[arg(long)]
        sound: Option<bool>,
        /// Whether to reduce animations.
        #[arg(long)]
        reduced_motion: Option<bool>,
    },
}

#[derive(Subcommand)]
enum ShopCommand {
    /// List every cosmetic, with prices and what you own.
    List {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Buy a cosmetic with coins.
    Buy {
        /// The cosmetic's id.
        id: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Equip an owned cosmetic in its slot.
    Equip {
        /// The cosmetic's id.
        id: String,
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Play {
            directory,
            host,
            port,
            open_browser,
        } => {
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                directory,
                host,
                port,
                session_started_at: Timestamp::now(),
            };
            start_server(config).await
        }
        Command::Check { directory } => check_collection(directory),
        Command::Stats { directory, format } => print_stats(directory, format),
        Command::Due { directory } => list_due(directory),
        Command::Export { directory, output } => export_save(directory, output),
        Command::Import { file, directory } => import_save(file, directory),
        Command::Reset { directory, yes } => reset(directory, yes),
        Command::Shop { command } => match command {
            ShopCommand::List { directory } => list_cosmetics(directory),
            ShopCommand::Buy { id, directory } => buy(id, directory),
            ShopCommand::Equip { id, directory } => equip(id, directory),
        },
        Command::Settings {
            directory,
            forge_size,
            sound,
            reduced_motion,
        } => update_settings(
            directory,
            SettingsPatch {
                sound_enabled: sound,
                reduced_motion,
                forge_size,
            },
        ),
    }
}
