pub mod config;
pub mod logging;

// Core modules
pub mod diskspace;
pub mod history;
pub mod recovery;
