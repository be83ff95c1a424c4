pub mod config;
pub mod decision;
pub mod engine;
pub mod features;
pub mod logging;
pub mod model;
pub mod paths;
pub mod resolver;
pub mod types;
pub mod urlparts;
