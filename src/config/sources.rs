//! Configuration sources added on top of the defaults.

/// Environment variable source: MD5DB__* prefix with __ separator
pub mod environment {
    use config::builder::DefaultState;
    use config::{ConfigBuilder, ConfigError, Environment};

    /// Add environment variable overlay to builder.
    /// `MD5DB__QUERY__LIMIT=5` sets `query.limit`.
    pub fn add_to_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(builder.add_source(
            Environment::with_prefix("MD5DB")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        ))
    }
}

/// Global config file under the platform config directory.
pub mod global_file {
    use crate::config::paths;
    use config::builder::DefaultState;
    use config::{ConfigBuilder, ConfigError, File};

    /// Add the global config file when the platform config directory is
    /// known. The file is optional.
    pub fn add_to_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        match paths::config_file() {
            Some(path) => Ok(builder.add_source(File::from(path).required(false))),
            None => Ok(builder),
        }
    }
}
