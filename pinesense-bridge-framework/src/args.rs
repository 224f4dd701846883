//! CLI argument parsing for bridges.

use std::path::PathBuf;

use clap::Parser;

/// CLI arguments common to all bridges.
///
/// Bridges with extra flags embed this with `#[command(flatten)]`.
#[derive(Parser, Debug, Clone)]
#[command(about = "PineSense sensor bridge")]
pub struct BridgeArgs {
    /// Path to configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl BridgeArgs {
    /// Parse CLI arguments, falling back to `default_config` when `--config`
    /// is absent.
    pub fn parse_with_default(default_config: &'static str) -> Self {
        parse_with_default_config(default_config)
    }
}

/// Parse any clap `Parser` that exposes a `config` argument, giving that
/// argument a default value.
///
/// Exits with a usage message on invalid arguments, like `Parser::parse`.
pub fn parse_with_default_config<P>(default_config: &'static str) -> P
where
    P: clap::Parser,
{
    let matches = <P as clap::CommandFactory>::command()
        .mut_arg("config", |arg| arg.default_value(default_config))
        .get_matches();

    <P as clap::FromArgMatches>::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args =
            BridgeArgs::try_parse_from(["bridge", "-c", "sensors.json5", "--log-level", "debug"])
                .unwrap();
        assert_eq!(args.config, PathBuf::from("sensors.json5"));
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_config_required_without_default() {
        assert!(BridgeArgs::try_parse_from(["bridge"]).is_err());
    }

    #[test]
    fn test_default_config_applied() {
        let matches = <BridgeArgs as clap::CommandFactory>::command()
            .mut_arg("config", |arg| arg.default_value("sensors.json5"))
            .try_get_matches_from(["bridge"])
            .unwrap();
        let args = <BridgeArgs as clap::FromArgMatches>::from_arg_matches(&matches).unwrap();

        assert_eq!(args.config, PathBuf::from("sensors.json5"));
        assert!(args.log_level.is_none());
    }
}
