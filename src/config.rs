use std::num::NonZeroU64;
use std::path::PathBuf;

use clap::{Parser, ValueHint};

/// Production units the progress page measures against.
pub const DEFAULT_TARGET: u64 = 3_000_000_000;

// ---------------------------------------------------------------------------
// Command line configuration
// ---------------------------------------------------------------------------

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Production KPI dashboard", long_about = None)]
pub struct Config {
    /// Records file to open at startup (.parquet, .json or .csv)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Production target for the progress page (must be non-zero)
    #[arg(long, default_value_t = NonZeroU64::new(DEFAULT_TARGET).unwrap_or(NonZeroU64::MIN))]
    pub target: NonZeroU64,

    /// Sidebar logo image; skipped when the file does not exist
    #[arg(long, default_value = "data/logo.png", value_hint = ValueHint::FilePath)]
    pub logo: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: None,
            target: NonZeroU64::new(DEFAULT_TARGET).unwrap_or(NonZeroU64::MIN),
            logo: PathBuf::from("data/logo.png"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::try_parse_from(["ops-dash"]).unwrap();
        assert_eq!(cfg.data, None);
        assert_eq!(cfg.target.get(), DEFAULT_TARGET);
        assert_eq!(cfg.logo, PathBuf::from("data/logo.png"));
    }

    #[test]
    fn test_explicit_values() {
        let cfg =
            Config::try_parse_from(["ops-dash", "--data", "prod.csv", "--target", "5000"]).unwrap();
        assert_eq!(cfg.data, Some(PathBuf::from("prod.csv")));
        assert_eq!(cfg.target.get(), 5000);
    }

    #[test]
    fn test_zero_target_rejected() {
        assert!(Config::try_parse_from(["ops-dash", "--target", "0"]).is_err());
    }
}
