use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::domain::{ClientError, ClientResult};

/// Routes `log` output to `path`; the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(path: &Path) -> ClientResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ClientError::Io(format!("{}: {}", path.display(), e)))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| ClientError::Config(e.to_string()))
}
