/// Database configuration and connection management
pub mod database;

/// Server and holiday configuration loading from config.toml
pub mod venue;
