//! Command-line arguments.

use crate::error::{DemavenError, Result};
use std::ffi::OsString;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: demaven [OPTIONS] <group#artifact[#version]> [organisation#module[#revision]]

Options:
  --config <FILE>  Configuration file (default: demaven.toml)
  --update         Update an already mapped library to its latest Maven version
  --write          Write the descriptor into the libraries directory
  --force          Overwrite an existing descriptor (with --write)
  -h, --help       Show this help

Environment:
  DEMAVEN_MAVEN_URL, DEMAVEN_LIBRARIES_DIR, DEMAVEN_MAPPINGS_FILE and
  DEMAVEN_LICENSES_FILE override the configuration file.
  RUST_LOG sets the log filter (default: info).
";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub update: bool,
    pub write: bool,
    pub force: bool,
    pub help: bool,
    /// Maven coordinate to translate, or an already mapped one with `--update`.
    pub coordinate: String,
    /// Explicit Ivy marker for the generated descriptor.
    pub translation: Option<String>,
}

fn usage(message: impl Into<String>) -> DemavenError {
    DemavenError::Usage(message.into())
}

impl Args {
    /// Parses arguments, the first being the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut iter = args.into_iter();
        let _argv0 = iter.next();

        let mut parsed = Self::default();
        let mut positional = Vec::new();

        while let Some(argument) = iter.next() {
            let arg = argument.to_string_lossy();
            match arg.as_ref() {
                "-h" | "--help" => parsed.help = true,
                "--update" => parsed.update = true,
                "--write" => parsed.write = true,
                "--force" => parsed.force = true,
                "--config" => {
                    if parsed.config.is_some() {
                        return Err(usage("`--config` may only be provided once"));
                    }
                    let file = iter
                        .next()
                        .ok_or_else(|| usage("missing file argument for `--config`"))?;
                    parsed.config = Some(PathBuf::from(file));
                }
                other if other.starts_with('-') && other.len() > 1 => {
                    return Err(usage(format!("unknown option `{other}`")));
                }
                other => positional.push(other.to_string()),
            }
        }

        if parsed.help {
            return Ok(parsed);
        }
        if parsed.force && !parsed.write {
            return Err(usage("`--force` requires `--write`"));
        }

        let mut positional = positional.into_iter();
        parsed.coordinate = positional
            .next()
            .ok_or_else(|| usage("missing Maven coordinate"))?;
        parsed.translation = positional.next();
        if let Some(extra) = positional.next() {
            return Err(usage(format!("unexpected argument `{extra}`")));
        }
        Ok(parsed)
    }
}
