pub mod api;
pub mod config;
pub mod data_models;
pub mod enricher;
pub mod error;
pub mod mapper;
pub mod search;
