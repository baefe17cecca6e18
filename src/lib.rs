pub mod background;
pub mod clients;
pub mod config;
pub mod display;
pub mod errors;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod storage;
pub mod utils;
