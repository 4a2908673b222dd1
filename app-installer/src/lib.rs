//! Installs a monitoring agent app (a folder of configuration files) into the agent apps
//! directory, upgrading it in place when another version is installed, and restarts the
//! agent so the new configuration is loaded.
pub mod cli;
pub mod config;
pub mod defaults;
pub mod event;
pub mod logging;
pub mod package;
pub mod pipeline;
pub mod report;
pub mod sanitizer;
pub mod service;
pub mod utils;
