//! Command-line translation of Maven artifacts into Ivy descriptors.
//!
//! [`run`] drives one invocation: load the [`Config`], resolve the requested
//! coordinate, print the rendered `ivy.xml` and, with `--write`, store it in
//! the libraries directory.

pub mod args;
pub mod config;
pub mod error;
pub mod translate;

pub use args::{Args, USAGE};
pub use config::Config;
pub use error::{DemavenError, Result};
pub use translate::{Request, Translator};

use demaven_core::{Fetcher, HttpFetcher};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Runs one translation, printing the descriptor to `out`.
///
/// Returns the path written to when `--write` was given.
pub async fn run(args: &Args, out: &mut impl Write) -> Result<Option<PathBuf>> {
    let config = Config::load(args.config.as_deref())?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new()?);
    run_with(&config, fetcher, args, out).await
}

/// [`run`] with an explicit configuration and fetcher.
pub async fn run_with(
    config: &Config,
    fetcher: Arc<dyn Fetcher>,
    args: &Args,
    out: &mut impl Write,
) -> Result<Option<PathBuf>> {
    let translator = Translator::new(config, fetcher)?;
    let request = Request {
        coordinate: args.coordinate.clone(),
        translation: args.translation.clone(),
        update: args.update,
    };
    let descriptor = translator.translate(&request).await?;

    let io_error = |source| DemavenError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    };
    writeln!(out).map_err(io_error)?;
    out.write_all(demaven_ivy::to_xml(&descriptor).as_bytes())
        .map_err(io_error)?;
    out.flush().map_err(io_error)?;

    if args.write {
        return Ok(Some(translator.write(&descriptor, args.force).await?));
    }
    Ok(None)
}
