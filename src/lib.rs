pub mod booking_catalog;
pub mod companies;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod financials;
pub mod indicators;
pub mod links;
pub mod logging;
pub mod models;
pub mod output;
pub mod parser;
pub mod pool;
