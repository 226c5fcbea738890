pub mod demo;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod paths;
pub mod session;
pub mod settings;
pub mod store;
