use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for geoindex-cli
#[derive(Debug, Parser)]
#[command(
    name = "geoindex-cli",
    version,
    about = "CLI for loading, querying and inspecting a geoindex-core place store"
)]
pub struct CliArgs {
    /// TOML settings file (store location, default locale, index options)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory of the file-backed store (default: ./geoindex-store)
    #[arg(short = 's', long = "store", global = true)]
    pub store: Option<PathBuf>,

    /// DuckDB file to use instead of the file-backed store
    #[cfg(feature = "relational")]
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    /// Locale for lookups and output (default: the configured default locale)
    #[arg(short = 'l', long = "locale", global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import place documents (a .json/.json.gz file or a directory of them)
    #[cfg(feature = "json")]
    Load {
        path: PathBuf,
    },

    /// Find places by text
    Geocode {
        text: String,

        /// Maximum number of results (0 = default of 30)
        #[arg(short = 'n', long = "limit", default_value_t = 0)]
        limit: usize,
    },

    /// Find the most specific place containing a point
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// List places whose boundary comes close to the boundary of a place
    Touching {
        /// Identifier of the stored place
        id: String,

        /// Maximum vertex distance in kilometers
        #[arg(long = "max-km", default_value_t = 0.1)]
        max_km: f64,
    },

    /// List places below an admin-level path, e.g. `0=Ukraine 2=Kyiv`
    Children {
        #[arg(required = true, value_parser = parse_level)]
        levels: Vec<(i32, String)>,
    },

    /// List stored places in insertion order
    Places {
        #[arg(long, default_value_t = 0)]
        offset: usize,

        #[arg(short = 'n', long = "limit", default_value_t = 50)]
        limit: usize,
    },

    /// Show one stored place
    Show {
        id: String,
    },

    /// Delete one stored place
    Delete {
        id: String,
    },

    /// List every known admin level
    Levels,
}

fn parse_level(s: &str) -> Result<(i32, String), String> {
    let (level, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LEVEL=NAME, got '{s}'"))?;
    let level = level
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad level '{level}': {e}"))?;
    Ok((level, name.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_pairs() {
        assert_eq!(parse_level("2=Kyiv"), Ok((2, "Kyiv".to_string())));
        assert_eq!(parse_level(" 0 = Ukraine "), Ok((0, "Ukraine".to_string())));
        assert!(parse_level("Kyiv").is_err());
        assert!(parse_level("x=Kyiv").is_err());
    }

    #[test]
    fn reverse_accepts_negative_coordinates() {
        let args = CliArgs::try_parse_from([
            "geoindex", "reverse", "--lat", "-33.86", "--lon", "151.21",
        ])
        .unwrap();
        match args.command {
            Commands::Reverse { lat, lon } => {
                assert_eq!(lat, -33.86);
                assert_eq!(lon, 151.21);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["geoindex", "levels", "--store", "/tmp/x", "-l", "de"]).unwrap();
        assert_eq!(args.store, Some(PathBuf::from("/tmp/x")));
        assert_eq!(args.locale.as_deref(), Some("de"));
    }
}
