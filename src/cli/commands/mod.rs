use crate::config::AppConfig;
use crate::errors::AppResult;
use std::path::Path;

pub mod lookup;
pub mod parse;
pub mod providers;
pub mod test_rpc;

/// Load `--config <FILE>` if given, else ./config.toml and the environment
pub(crate) fn load_config(path: Option<&Path>) -> AppResult<AppConfig> {
    Ok(AppConfig::load_from(path)?)
}
