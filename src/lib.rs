pub mod auth;
pub mod catalog;
pub mod config;
pub mod datasets;
mod engine;
pub mod http;
pub mod id;
pub mod storage;
pub mod tabular;
pub mod telemetry;

pub use engine::{DatasetView, DeckEngine, DeckEngineBuilder};
