//! Command definitions for the pomoloop CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::daemon::DaemonOptions;
use crate::types::SESSION_COUNT_BASELINE;

// ============================================================================
// CLI Structure
// ============================================================================

/// pomoloop - continuous work/break loop
#[derive(Parser, Debug)]
#[command(
    name = "pomoloop",
    version,
    about = "作業と休憩を繰り返すポモドーロタイマー",
    long_about = "作業と休憩を交互に自動で繰り返すポモドーロタイマー。\n\
                  デーモンがタイマーを進め、CLIはUnixソケット経由で操作します。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Socket path (default: ~/.pomoloop/pomoloop.sock)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer daemon in the foreground
    Daemon(DaemonArgs),

    /// Start or resume the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Show current timer status
    Status(StatusArgs),

    /// Change work and break durations
    Config(ConfigArgs),

    /// Reset the completed session count
    Reset(ResetArgs),

    /// Reset the session count and stop the daemon
    Quit,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Work duration in minutes, overriding the saved value (values below 1 become 1)
    #[arg(short, long, allow_negative_numbers = true)]
    pub work: Option<i64>,

    /// Break duration in minutes, overriding the saved value (values below 1 become 1)
    #[arg(short, long, allow_negative_numbers = true)]
    pub break_time: Option<i64>,

    /// Disable cue sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Show desktop notifications instead of terminal messages
    #[arg(long)]
    pub desktop_notify: bool,

    /// Directory with work_start / break_start / break_end / alert sound files
    #[arg(long, value_name = "DIR")]
    pub sound_dir: Option<PathBuf>,

    /// State file (default: ~/.pomoloop/state.json)
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,
}

impl DaemonArgs {
    /// Converts the arguments into daemon options.
    pub fn into_options(self, socket_path: Option<PathBuf>) -> DaemonOptions {
        DaemonOptions {
            work_minutes: self.work,
            break_minutes: self.break_time,
            no_sound: self.no_sound,
            desktop_notify: self.desktop_notify,
            sound_dir: self.sound_dir,
            state_file: self.state_file,
            socket_path,
        }
    }
}

/// Arguments for the status command
#[derive(Args, Debug, Clone, Default)]
pub struct StatusArgs {
    /// Keep redrawing the status once per second
    #[arg(short, long)]
    pub watch: bool,
}

/// Arguments for the config command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Work duration in minutes (values below 1 become 1)
    #[arg(short, long, allow_negative_numbers = true)]
    pub work: i64,

    /// Break duration in minutes (values below 1 become 1)
    #[arg(short, long, allow_negative_numbers = true)]
    pub break_time: i64,
}

/// Arguments for the reset command
#[derive(Args, Debug, Clone)]
pub struct ResetArgs {
    /// New session count
    #[arg(long, default_value_t = SESSION_COUNT_BASELINE)]
    pub baseline: u32,
}

impl Default for ResetArgs {
    fn default() -> Self {
        Self {
            baseline: SESSION_COUNT_BASELINE,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["pomoloop"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(cli.socket.is_none());
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["pomoloop", "-v", "status"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_global_socket() {
            let cli = Cli::parse_from(["pomoloop", "status", "--socket", "/tmp/p.sock"]);
            assert_eq!(cli.socket, Some(PathBuf::from("/tmp/p.sock")));
        }

        #[test]
        fn test_parse_simple_commands() {
            assert!(matches!(
                Cli::parse_from(["pomoloop", "start"]).command,
                Some(Commands::Start)
            ));
            assert!(matches!(
                Cli::parse_from(["pomoloop", "pause"]).command,
                Some(Commands::Pause)
            ));
            assert!(matches!(
                Cli::parse_from(["pomoloop", "quit"]).command,
                Some(Commands::Quit)
            ));
        }

        #[test]
        fn test_parse_unknown_command_fails() {
            assert!(Cli::try_parse_from(["pomoloop", "resume"]).is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Subcommand Argument Tests
    // ------------------------------------------------------------------------

    mod args_tests {
        use super::*;

        #[test]
        fn test_parse_status_watch() {
            match Cli::parse_from(["pomoloop", "status", "--watch"]).command {
                Some(Commands::Status(args)) => assert!(args.watch),
                other => panic!("Expected Status command, got {:?}", other),
            }
            match Cli::parse_from(["pomoloop", "status"]).command {
                Some(Commands::Status(args)) => assert!(!args.watch),
                other => panic!("Expected Status command, got {:?}", other),
            }
        }

        #[test]
        fn test_parse_config_accepts_non_positive() {
            let cli = Cli::parse_from(["pomoloop", "config", "--work", "0", "--break-time", "-3"]);
            match cli.command {
                Some(Commands::Config(args)) => {
                    assert_eq!(args.work, 0);
                    assert_eq!(args.break_time, -3);
                }
                other => panic!("Expected Config command, got {:?}", other),
            }
        }

        #[test]
        fn test_parse_config_requires_both() {
            assert!(Cli::try_parse_from(["pomoloop", "config", "--work", "30"]).is_err());
        }

        #[test]
        fn test_parse_reset_default_baseline() {
            match Cli::parse_from(["pomoloop", "reset"]).command {
                Some(Commands::Reset(args)) => assert_eq!(args.baseline, 1),
                other => panic!("Expected Reset command, got {:?}", other),
            }
            match Cli::parse_from(["pomoloop", "reset", "--baseline", "0"]).command {
                Some(Commands::Reset(args)) => assert_eq!(args.baseline, 0),
                other => panic!("Expected Reset command, got {:?}", other),
            }
        }

        #[test]
        fn test_parse_daemon_options() {
            let cli = Cli::parse_from([
                "pomoloop",
                "daemon",
                "-w",
                "50",
                "-b",
                "10",
                "--no-sound",
                "--desktop-notify",
                "--sound-dir",
                "/snd",
                "--state-file",
                "/tmp/state.json",
                "--socket",
                "/tmp/p.sock",
            ]);
            let socket = cli.socket.clone();
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    let options = args.into_options(socket);
                    assert_eq!(options.work_minutes, Some(50));
                    assert_eq!(options.break_minutes, Some(10));
                    assert!(options.no_sound);
                    assert!(options.desktop_notify);
                    assert_eq!(options.sound_dir, Some(PathBuf::from("/snd")));
                    assert_eq!(options.state_file, Some(PathBuf::from("/tmp/state.json")));
                    assert_eq!(options.socket_path, Some(PathBuf::from("/tmp/p.sock")));
                }
                other => panic!("Expected Daemon command, got {:?}", other),
            }
        }

        #[test]
        fn test_parse_daemon_defaults() {
            match Cli::parse_from(["pomoloop", "daemon"]).command {
                Some(Commands::Daemon(args)) => {
                    assert!(args.work.is_none());
                    assert!(args.break_time.is_none());
                    assert!(!args.no_sound);
                    assert!(!args.desktop_notify);
                }
                other => panic!("Expected Daemon command, got {:?}", other),
            }
        }

        #[test]
        fn test_parse_completions() {
            let cli = Cli::parse_from(["pomoloop", "completions", "bash"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Completions {
                    shell: clap_complete::Shell::Bash
                })
            ));
        }
    }

    #[test]
    fn test_command_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
