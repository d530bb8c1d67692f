//! # Item Catalog
//!
//! A small catalog service: clients submit named, categorized items
//! together with an image; the service stores item records in SQLite,
//! normalizes categories into a lookup table, stores every image exactly
//! once under a content-derived name, and serves items and images back over
//! HTTP and a CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────────┐
//! │   HTTP   │──▶│          │──▶│ Store         │──▶ SQLite
//! │ (server) │   │ Catalog  │   │ items + cats  │
//! └──────────┘   │          │   └───────────────┘
//! ┌──────────┐   │          │   ┌───────────────┐
//! │   CLI    │──▶│          │──▶│ ImageStore    │──▶ images/<sha256>.jpg
//! │(catalog) │   └──────────┘   └───────────────┘
//! └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! catalog init
//! catalog add "used iPhone 16e" phone --image ./phone.jpg
//! catalog search iPhone
//! catalog serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | `CatalogError` and its error kinds |
//! | [`models`] | `Item`, `NewItem`, `Category` |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Schema creation (idempotent) |
//! | [`store`] | Category resolution and item persistence (SQLite, in-memory) |
//! | [`images`] | Content-addressed image storage with path validation |
//! | [`catalog`] | Store + image store facade |
//! | [`server`] | HTTP server (Axum) with CORS |
//! | [`cli`] | CLI command implementations |
//! | [`logging`] | Tracing subscriber setup |

pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod server;
pub mod store;

pub use catalog::Catalog;
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use images::ImageStore;
pub use models::{Category, Item, NewItem};
pub use store::{MemoryStore, SqliteStore, Store};
