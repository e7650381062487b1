//! Test utilities & fixtures.
//! Builds a throwaway data directory seeded with the bundled sample dungeons.

use std::sync::Arc;

use escapade::config::{Argon2Config, Config};
use escapade::game::{AccountRepository, DungeonRepository, EscapeFacade};
use escapade::storage::JsonStore;

/// Config pointing at `dir`, with cheap Argon2 parameters so tests stay fast.
pub fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = dir.to_string_lossy().to_string();
    config.security.argon2 = Some(Argon2Config {
        memory_kib: Some(1024),
        time_cost: Some(1),
        parallelism: Some(1),
    });
    config
}

/// A temp data directory with the sample dungeons written into it.
pub fn sample_store() -> (tempfile::TempDir, Config, JsonStore) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = test_config(tmp.path());
    let store = JsonStore::new(&config.storage, config.game.base_time_budget_ms);
    store.ensure_dirs().expect("data dirs");
    store.write_sample_dungeons().expect("sample dungeons");
    (tmp, config, store)
}

/// A facade over everything currently in `store`, saving back into it.
#[allow(dead_code)] // Not every test binary builds a facade.
pub fn facade_for(config: &Config, store: &JsonStore) -> EscapeFacade {
    let accounts = Arc::new(AccountRepository::from_accounts(store.load_accounts().unwrap()));
    let dungeons = Arc::new(DungeonRepository::from_dungeons(store.load_dungeons().unwrap()));
    EscapeFacade::from_config(config, accounts, dungeons)
        .with_leaderboard(store.load_leaderboard().unwrap())
        .with_persistence(Box::new(store.clone()))
}
