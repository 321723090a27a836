mod manager;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_PORT, ProviderConfig, ResolveOptions, ResolvedConfig,
    TarjimaniConfig, resolve_config,
};
