//! Command-line configuration.
//!
//! The server takes exactly two positional arguments: the filesystem path
//! for the local endpoint and the TCP port. A wrong argument count prints
//! usage to stderr and exits with a failure status.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the arithmetic server
#[derive(Parser, Debug)]
#[command(name = "calcd")]
#[command(version = "0.1.0")]
#[command(about = "A dual-transport binary arithmetic server", long_about = None)]
pub struct Config {
    /// Filesystem path for the local (Unix domain) endpoint
    pub socket: PathBuf,

    /// TCP port to listen on
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_args() {
        let config = Config::try_parse_from(["calcd", "/tmp/calc.sock", "9000"]).unwrap();
        assert_eq!(config.socket, PathBuf::from("/tmp/calc.sock"));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_missing_args_rejected() {
        assert!(Config::try_parse_from(["calcd"]).is_err());
        assert!(Config::try_parse_from(["calcd", "/tmp/calc.sock"]).is_err());
    }

    #[test]
    fn test_extra_args_rejected() {
        assert!(Config::try_parse_from(["calcd", "/tmp/calc.sock", "9000", "extra"]).is_err());
    }

    #[test]
    fn test_out_of_range_port_rejected() {
        assert!(Config::try_parse_from(["calcd", "/tmp/calc.sock", "70000"]).is_err());
    }
}
