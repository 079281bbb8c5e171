//! Command-Line Argument Parsing Module
//!
//! Uses clap for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// epoll demo command-line arguments
#[derive(Parser, Debug)]
#[command(name = "epoll-demo")]
#[command(about = "Drive epoll through sequences the epoll checker reports on")]
pub struct DemoArgs {
    #[command(subcommand)]
    pub scenario: Scenario,
}

/// Call sequence to run
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Register stdin for input and poll it without reading
    IdleStdin {
        /// Number of zero-timeout polls
        #[arg(long, default_value_t = 3)]
        polls: usize,
    },
    /// Register a socket for input, then re-arm it for output without reading
    UndrainedRearm,
    /// Same as undrained-rearm, but drain the socket before re-arming
    DrainedRearm,
    /// One-shot input registration: fire, drain, re-arm
    OneShot,
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::IdleStdin { .. } => "idle-stdin",
            Scenario::UndrainedRearm => "undrained-rearm",
            Scenario::DrainedRearm => "drained-rearm",
            Scenario::OneShot => "one-shot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let args = DemoArgs::try_parse_from(["epoll-demo", "undrained-rearm"]).unwrap();
        assert_eq!(args.scenario, Scenario::UndrainedRearm);

        let args = DemoArgs::try_parse_from(["epoll-demo", "one-shot"]).unwrap();
        assert_eq!(args.scenario.name(), "one-shot");
    }

    #[test]
    fn test_idle_stdin_polls() {
        let args = DemoArgs::try_parse_from(["epoll-demo", "idle-stdin"]).unwrap();
        assert_eq!(args.scenario, Scenario::IdleStdin { polls: 3 });

        let args = DemoArgs::try_parse_from(["epoll-demo", "idle-stdin", "--polls", "7"]).unwrap();
        assert_eq!(args.scenario, Scenario::IdleStdin { polls: 7 });
    }

    #[test]
    fn test_scenario_required() {
        assert!(DemoArgs::try_parse_from(["epoll-demo"]).is_err());
        assert!(DemoArgs::try_parse_from(["epoll-demo", "bogus"]).is_err());
    }
}
