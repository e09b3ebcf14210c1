use crate::commands::Out;
use crate::error::{Error, ErrorType};
use crate::{BackendKind, Config, Result};
use std::path::Path;
use url::Url;

/// Creates the home directory and an initial `config.json` in it.
///
/// # Arguments
/// - `fin_home` - The directory that will hold the configuration, e.g. `$HOME/fin`
/// - `backend` - Where transactions are kept
/// - `base_url` - The REST server for `BackendKind::Http`. Defaults to `DEFAULT_BASE_URL`.
///
/// # Errors
/// - Returns an error if the directory is already initialized or any file operation fails.
pub async fn init(
    fin_home: &Path,
    backend: BackendKind,
    base_url: Option<Url>,
) -> Result<Out<()>> {
    if base_url.is_some() && backend != BackendKind::Http {
        return Err(Error::new(
            ErrorType::Config,
            anyhow::anyhow!("--base-url can only be used with --backend http"),
        ));
    }
    let config = Config::create(fin_home, backend, base_url)
        .await
        .map_err(|e| e.context("Unable to create the home directory and config"))?;
    let location = match config.config_path() {
        Some(path) => path.display().to_string(),
        None => fin_home.display().to_string(),
    };
    Ok(format!("Created the {backend} configuration at {location}").into())
}
