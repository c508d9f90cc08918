use std::sync::Arc;

use tracing::info;

use super::{
    config::{Config, StorageBackend},
    database::{Database, RedisStore},
    menus::MenuService,
    store::{MealStore, MemoryStore, StoreError},
};

pub struct AppState {
    pub config: Config,
    pub menus: MenuService,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, StoreError> {
        let store = open_store(&config)?;

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn MealStore>) -> Arc<Self> {
        let menus = MenuService::new(store, config.default_period.clone());

        Arc::new(Self { config, menus })
    }
}

pub fn open_store(config: &Config) -> Result<Arc<dyn MealStore>, StoreError> {
    match config.storage {
        StorageBackend::Redis => {
            info!("Using Redis store with prefix {}", config.redis.key_prefix);
            let database = Arc::new(Database::new(&config.redis)?);

            Ok(Arc::new(RedisStore::new(database, &config.redis.key_prefix)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store");

            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
