//! # State Module
//!
//! Shared state handed to every handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      axum Router                                │   │
//! │  │  build_router(AppState { db, config })                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │ State(state) extractor (cloned)          │
//! │                  ┌───────────┴───────────┐                              │
//! │                  ▼                       ▼                              │
//! │  ┌──────────────────────┐   ┌──────────────────────────┐               │
//! │  │   Database           │   │   Arc<FrontDeskConfig>   │               │
//! │  │   (SqlitePool,       │   │   hotel name, bind addr, │               │
//! │  │    cheap to clone)   │   │   db path                │               │
//! │  └──────────────────────┘   └──────────────────────────┘               │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: internal connection pool; serialization of competing      │
//! │    writes happens inside SQLite transactions, not in this process      │
//! │  • Config: read-only after startup                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

use std::sync::Arc;

pub use config::{ConfigError, FrontDeskConfig, CONFIG_FILE_NAME};

use innkeep_db::Database;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<FrontDeskConfig>,
}

impl AppState {
    pub fn new(db: Database, config: FrontDeskConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
