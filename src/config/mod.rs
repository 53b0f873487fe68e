pub mod configuration;
pub mod loader;
pub mod scan_config;

// Re-export commonly used types
pub use configuration::Configuration;
pub use loader::{ConfigLoader, USER_CONFIG_PATH};
pub use scan_config::{ErrorPolicy, LogSettings, ScanConfig};
