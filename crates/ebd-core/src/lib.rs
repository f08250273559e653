pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod events;
pub mod feed;
pub mod orchestrator;
pub mod retry;
pub mod scene;
pub mod storage;
pub mod store;
pub mod transport;
pub mod url_model;
