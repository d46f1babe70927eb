pub mod api;
pub mod codec;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod events;
pub mod factory;
pub mod flows;
pub mod graph;
pub mod resolver;
pub mod store;
