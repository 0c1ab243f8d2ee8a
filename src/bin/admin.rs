//! Admin tool: access keys, the admin password hash and a stats check
//!
//! ```text
//! admin hash-password <password>
//! admin add-key <key> [--label workshop]
//! admin list-keys
//! admin revoke-key <id>
//! admin check-stats [--stats-db data/stats.db]
//! admin insert-test-data [--stats-db data/stats.db]
//! ```

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use flexi_logger::Logger;
use std::error::Error;
use std::path::PathBuf;

use proposal_cards::auth::password::{hash_password, validate_password};
use proposal_cards::auth::{AuthDatabase, AuthError};
use proposal_cards::game::GameCatalog;
use proposal_cards::stats::aggregate::{self, build_report};
use proposal_cards::stats::keys::{self, date_str};
use proposal_cards::stats::seed::insert_test_data;
use proposal_cards::stats::{KeyValueStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "admin", about = "Manage access keys and inspect usage statistics")]
struct Args {
    /// SQLite file holding the hashed access keys
    #[arg(long, default_value = "data/access_keys.db", global = true)]
    auth_db: String,

    /// SQLite file for usage statistics
    #[arg(long, default_value = "data/stats.db", global = true)]
    stats_db: String,

    /// Game definitions, used for game names in stats output
    #[arg(long, default_value = "data/games", global = true)]
    games_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the argon2 hash to put in ADMIN_PASSWORD_HASH
    HashPassword { password: String },

    /// Store a new access key
    AddKey {
        key: String,
        #[arg(long)]
        label: Option<String>,
    },

    /// List stored access keys (masked)
    ListKeys,

    /// Revoke an access key by id
    RevokeKey { id: String },

    /// Print recent history and today's counters
    CheckStats {
        /// History entries to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Fill the stats store with sample data
    InsertTestData,
}

fn main() -> Result<(), Box<dyn Error>> {
    Logger::try_with_env_or_str("warn")?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let args = Args::parse();
    match args.command {
        Command::HashPassword { password } => {
            validate_password(&password)?;
            println!("{}", hash_password(&password)?);
        }
        Command::AddKey { key, label } => {
            let db = AuthDatabase::new(&args.auth_db)?;
            match db.add_key(&key, label.as_deref()) {
                Ok(record) => println!("✅ Added {} ({})", record.masked, record.id),
                Err(AuthError::InvalidFormat) => {
                    return Err(format!(
                        "invalid key format: {}",
                        proposal_cards::auth::access_key::FORMAT_HINT
                    )
                    .into())
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::ListKeys => {
            let db = AuthDatabase::new(&args.auth_db)?;
            let records = db.list_keys()?;
            if records.is_empty() {
                println!("No access keys");
            }
            for record in records {
                println!(
                    "{}  {:<14} {:<8} {}  {}",
                    record.id,
                    record.masked,
                    if record.revoked { "revoked" } else { "active" },
                    record.created_at,
                    record.label.unwrap_or_default()
                );
            }
        }
        Command::RevokeKey { id } => {
            let db = AuthDatabase::new(&args.auth_db)?;
            if db.revoke_key(&id)? {
                println!("✅ Revoked {}", id);
            } else {
                return Err(format!("no active key with id {}", id).into());
            }
        }
        Command::CheckStats { limit } => {
            let store = SqliteStore::new(&args.stats_db)?;
            check_stats(&store, &args.games_dir, limit, Utc::now());
        }
        Command::InsertTestData => {
            let store = SqliteStore::new(&args.stats_db)?;
            let written = insert_test_data(&store, Utc::now(), &mut rand::rng())?;
            println!("✅ Inserted test data ({} keys) into {}", written, args.stats_db);
        }
    }
    Ok(())
}

fn check_stats(store: &dyn KeyValueStore, games_dir: &std::path::Path, limit: i64, now: DateTime<Utc>) {
    let games = match GameCatalog::load_dir(games_dir) {
        Ok(catalog) => catalog.names(),
        Err(e) => {
            eprintln!("⚠️  Could not load games from {}: {}", games_dir.display(), e);
            Vec::new()
        }
    };
    let today = date_str(now.date_naive());

    println!("{}", "=".repeat(60));
    println!("[1] History (latest {})", limit);
    println!("{}", "-".repeat(60));
    let history = aggregate::history(store, limit);
    if history.is_empty() {
        println!("  No history yet");
    }
    for (index, entry) in history.iter().enumerate() {
        let at = entry
            .get("timestamp")
            .and_then(|t| t.as_i64())
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("  [{}] {}", index + 1, at);
        for field in ["eventType", "gameId", "accessKey", "success", "error", "location"] {
            if let Some(value) = entry.get(field).filter(|v| !v.is_null()) {
                println!("      {}: {}", field, value);
            }
        }
    }

    println!();
    println!("[2] Today ({})", today);
    println!("{}", "-".repeat(60));
    let report = build_report(store, &games, now);
    println!("  Total today: {}", report.summary.today);
    let today_keys: Vec<String> = games.iter().map(|(id, _)| keys::game(id, &today)).collect();
    for ((_, name), count) in games.iter().zip(aggregate::read_counts(store, &today_keys)) {
        if count > 0 {
            println!("    - {}: {}", name, count);
        }
    }

    println!();
    println!("[3] Event types (today)");
    println!("{}", "-".repeat(60));
    let type_keys: Vec<String> = keys::KNOWN_EVENT_TYPES
        .iter()
        .map(|t| keys::event_type(t, &today))
        .collect();
    for (event_type, count) in keys::KNOWN_EVENT_TYPES.iter().zip(aggregate::read_counts(store, &type_keys)) {
        if count > 0 {
            println!("  {}: {}", event_type, count);
        }
    }

    println!();
    println!("[4] Access keys");
    println!("{}", "-".repeat(60));
    for stat in &report.access_key_stats {
        println!("  {}: {}", stat.access_key, stat.count);
    }
    println!("{}", "=".repeat(60));
}
