use clap::{Parser, Subcommand};
use clap_num::maybe_hex;

use crate::u4;
use crate::vm::MachineError;

#[derive(Parser)]
#[command(multicall = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    #[command(visible_alias = "r")]
    Run,

    #[command(visible_alias = "p")]
    Pause,

    #[command(visible_alias = "s")]
    Step,

    #[command(visible_alias = "b")]
    Breakpoint {
        #[command(subcommand)]
        action: BreakpointAction,
    },

    Set {
        #[arg(value_parser = parse_set_target)]
        target: SetTarget,
        #[arg(value_parser = maybe_hex::<u16>)]
        value: u16,
    },

    #[command(visible_alias = "m")]
    Mem {
        #[arg(default_value = "0", value_parser = maybe_hex::<u16>)]
        start: u16,
        #[arg(default_value = "64", value_parser = maybe_hex::<u16>)]
        len: u16,
    },

    #[command(visible_alias = "q")]
    Quit,
}

pub enum CommandResult {
    Ok,
    BreakpointList { breakpoints: Vec<u16> },
    MemDump { start: u16, bytes: Vec<u8> },
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Error while executing cpu instruction: {0}")]
    Machine(#[from] MachineError),
    #[error("Value out of range")]
    ValueOutOfRange,
}

#[derive(Subcommand, Clone)]
pub enum BreakpointAction {
    #[command(visible_alias = "s")]
    Set {
        #[arg(value_parser = maybe_hex::<u16>)]
        addr: u16,
    },

    #[command(visible_alias = "c")]
    Clear {
        #[arg(value_parser = maybe_hex::<u16>)]
        addr: u16,
    },

    #[command(visible_alias = "l")]
    List,

    #[command(visible_alias = "ca")]
    ClearAll,
}

#[derive(Clone)]
pub enum SetTarget {
    V(u4),
    I,
    Pc,
}

fn parse_set_target(s: &str) -> Result<SetTarget, String> {
    let lower = s.to_lowercase();

    match lower.as_str() {
        "index" | "i" => Ok(SetTarget::I),
        "pc" => Ok(SetTarget::Pc),

        _ if lower.starts_with('v') => {
            let hex_str = &lower[1..];
            match u8::from_str_radix(hex_str, 16) {
                Ok(val) if val < 16 => Ok(SetTarget::V(u4::new(val))),
                _ => Err(format!("Invalid register: '{}'", s)),
            }
        }

        _ => Err(format!("Unknown set target: '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_word_commands_and_aliases() {
        assert!(matches!(
            Cli::try_parse_from(["run"]).unwrap().command,
            Command::Run
        ));
        assert!(matches!(
            Cli::try_parse_from(["s"]).unwrap().command,
            Command::Step
        ));
        assert!(matches!(
            Cli::try_parse_from(["q"]).unwrap().command,
            Command::Quit
        ));
    }

    #[test]
    fn parses_breakpoint_addresses_in_hex_or_decimal() {
        let cli = Cli::try_parse_from(["b", "s", "0x200"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Breakpoint {
                action: BreakpointAction::Set { addr: 0x200 }
            }
        ));

        let cli = Cli::try_parse_from(["breakpoint", "clear", "512"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Breakpoint {
                action: BreakpointAction::Clear { addr: 512 }
            }
        ));
    }

    #[test]
    fn parses_set_targets() {
        let cli = Cli::try_parse_from(["set", "vA", "0xFF"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Set {
                target: SetTarget::V(reg),
                value: 0xFF
            } if reg == u4::new(0xA)
        ));

        let cli = Cli::try_parse_from(["set", "pc", "0x300"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Set {
                target: SetTarget::Pc,
                value: 0x300
            }
        ));

        assert!(Cli::try_parse_from(["set", "vG", "0"]).is_err());
        assert!(Cli::try_parse_from(["set", "sp", "0"]).is_err());
    }

    #[test]
    fn mem_defaults_to_the_start_of_memory() {
        let cli = Cli::try_parse_from(["mem"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Mem { start: 0, len: 64 }
        ));

        let cli = Cli::try_parse_from(["m", "0x200", "32"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Mem {
                start: 0x200,
                len: 32
            }
        ));
    }
}
