use super::commands::{BreakpointAction, Command, CommandError, CommandResult, SetTarget};
use crate::vm::{Display, MEMORY_SIZE, MachineError, Runner, RunnerResult};
use std::collections::HashSet;

/// Executes debugger commands against a paused or free-running machine.
pub struct Executor {
    is_running: bool,
    runner: Runner,
    breakpoints: HashSet<u16>,
}

impl Executor {
    pub fn new(runner: Runner) -> Self {
        Self {
            is_running: false,
            runner,
            breakpoints: HashSet::new(),
        }
    }

    /// Advances the machine if it is free-running, pausing on breakpoints
    /// and on machine errors.
    pub fn poll(&mut self, dt: f32) -> Result<RunnerResult, MachineError> {
        if !self.is_running {
            return Ok(RunnerResult::Ok);
        }

        let result = self
            .runner
            .update_with_breakpoints(dt, Some(&self.breakpoints));

        if matches!(result, Err(_) | Ok(RunnerResult::HitBreakpoint)) {
            self.is_running = false;
        }

        result
    }

    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        match command {
            Command::Run => {
                self.execute_run();
                Ok(CommandResult::Ok)
            }
            Command::Pause => {
                self.execute_pause();
                Ok(CommandResult::Ok)
            }
            Command::Step => self.execute_step(),
            Command::Breakpoint { action } => self.handle_breakpoint(action),
            Command::Set { target, value } => self.handle_set(target, value),
            Command::Mem { start, len } => self.handle_mem(start, len),
            Command::Quit => Ok(CommandResult::Quit),
        }
    }

    pub fn execute_run(&mut self) {
        self.is_running = true;
    }

    pub fn execute_pause(&mut self) {
        self.is_running = false;
    }

    pub fn execute_step(&mut self) -> Result<CommandResult, CommandError> {
        self.runner.machine_mut().cycle()?;
        Ok(CommandResult::Ok)
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn get_display(&self) -> &Display<bool> {
        self.runner.machine().display()
    }

    pub fn get_pc(&self) -> u16 {
        self.runner.machine().pc()
    }

    pub fn get_i(&self) -> u16 {
        self.runner.machine().i()
    }

    pub fn get_v(&self) -> &[u8; 16] {
        self.runner.machine().v()
    }

    pub fn get_stack(&self) -> &[u16] {
        self.runner.machine().stack()
    }

    pub fn get_delay_timer(&self) -> u8 {
        self.runner.machine().delay_timer()
    }

    pub fn get_sound_timer(&self) -> u8 {
        self.runner.machine().sound_timer()
    }

    pub fn get_keypad(&self) -> &[bool; 16] {
        self.runner.machine().keypad()
    }

    pub fn runner_mut(&mut self) -> &mut Runner {
        &mut self.runner
    }

    fn handle_breakpoint(
        &mut self,
        action: BreakpointAction,
    ) -> Result<CommandResult, CommandError> {
        match action {
            BreakpointAction::Set { addr } => {
                self.breakpoints.insert(addr);
            }
            BreakpointAction::Clear { addr } => {
                self.breakpoints.remove(&addr);
            }
            BreakpointAction::ClearAll => {
                self.breakpoints.clear();
            }
            BreakpointAction::List => {
                return Ok(CommandResult::BreakpointList {
                    breakpoints: {
                        let mut bps: Vec<u16> = self.breakpoints.iter().cloned().collect();
                        bps.sort();
                        bps
                    },
                });
            }
        };

        Ok(CommandResult::Ok)
    }

    fn handle_set(&mut self, target: SetTarget, value: u16) -> Result<CommandResult, CommandError> {
        let machine = self.runner.machine_mut();

        match target {
            SetTarget::V(reg) => {
                if value > 0xFF {
                    return Err(CommandError::ValueOutOfRange);
                }
                machine.v[reg] = value as u8;
            }
            SetTarget::I => {
                machine.i = value;
            }
            SetTarget::Pc => {
                if usize::from(value) >= MEMORY_SIZE {
                    return Err(CommandError::ValueOutOfRange);
                }
                machine.pc = value;
            }
        }

        Ok(CommandResult::Ok)
    }

    fn handle_mem(&self, start: u16, len: u16) -> Result<CommandResult, CommandError> {
        let begin = usize::from(start);
        if begin >= MEMORY_SIZE {
            return Err(CommandError::ValueOutOfRange);
        }

        let end = MEMORY_SIZE.min(begin + usize::from(len));
        let bytes = self.runner.machine().memory()[begin..end].to_vec();

        Ok(CommandResult::MemDump { start, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::u4;
    use crate::vm::Machine;

    fn executor_with(program: &[u16]) -> Executor {
        let mut machine = Machine::new();
        let rom: Vec<u8> = program.iter().flat_map(|word| word.to_be_bytes()).collect();
        machine.load(&rom).unwrap();
        Executor::new(Runner::new(machine))
    }

    #[test]
    fn step_advances_one_instruction_while_paused() {
        let mut executor = executor_with(&[0x6105]);

        executor.execute(Command::Step).unwrap();

        assert_eq!(executor.get_v()[1], 5);
        assert_eq!(executor.get_pc(), 0x202);
        assert!(!executor.is_running());
    }

    #[test]
    fn poll_does_nothing_until_run() {
        let mut executor = executor_with(&[0x6105]);

        executor.poll(1.0).unwrap();
        assert_eq!(executor.get_pc(), 0x200);

        executor.execute(Command::Run).unwrap();
        executor.poll(1.0 / 700.0).unwrap();
        assert_eq!(executor.get_pc(), 0x202);
    }

    #[test]
    fn poll_pauses_when_a_breakpoint_is_hit() {
        let mut executor = executor_with(&[0x6105, 0x6206, 0x6307]);
        executor
            .execute(Command::Breakpoint {
                action: BreakpointAction::Set { addr: 0x202 },
            })
            .unwrap();
        executor.execute(Command::Run).unwrap();

        let result = executor.poll(1.0);

        assert!(matches!(result, Ok(RunnerResult::HitBreakpoint)));
        assert_eq!(executor.get_pc(), 0x202);
        assert!(!executor.is_running());
    }

    #[test]
    fn breakpoint_list_is_sorted() {
        let mut executor = executor_with(&[0x6105]);
        for addr in [0x300u16, 0x200, 0x250] {
            executor
                .execute(Command::Breakpoint {
                    action: BreakpointAction::Set { addr },
                })
                .unwrap();
        }

        let result = executor
            .execute(Command::Breakpoint {
                action: BreakpointAction::List,
            })
            .unwrap();

        assert!(matches!(
            result,
            CommandResult::BreakpointList { breakpoints } if breakpoints == [0x200, 0x250, 0x300]
        ));
    }

    #[test]
    fn clear_all_removes_every_breakpoint() {
        let mut executor = executor_with(&[0x6105]);
        executor
            .execute(Command::Breakpoint {
                action: BreakpointAction::Set { addr: 0x200 },
            })
            .unwrap();
        executor
            .execute(Command::Breakpoint {
                action: BreakpointAction::ClearAll,
            })
            .unwrap();

        let result = executor
            .execute(Command::Breakpoint {
                action: BreakpointAction::List,
            })
            .unwrap();

        assert!(matches!(
            result,
            CommandResult::BreakpointList { breakpoints } if breakpoints.is_empty()
        ));
    }

    #[test]
    fn set_writes_registers_with_range_checks() {
        let mut executor = executor_with(&[0x6105]);

        executor
            .execute(Command::Set {
                target: SetTarget::V(u4::new(5)),
                value: 0x42,
            })
            .unwrap();
        assert_eq!(executor.get_v()[5], 0x42);

        executor
            .execute(Command::Set {
                target: SetTarget::Pc,
                value: 0x300,
            })
            .unwrap();
        assert_eq!(executor.get_pc(), 0x300);

        assert!(matches!(
            executor.execute(Command::Set {
                target: SetTarget::V(u4::new(5)),
                value: 0x100,
            }),
            Err(CommandError::ValueOutOfRange)
        ));
        assert!(matches!(
            executor.execute(Command::Set {
                target: SetTarget::Pc,
                value: 0x1000,
            }),
            Err(CommandError::ValueOutOfRange)
        ));
    }

    #[test]
    fn mem_dump_clamps_to_the_end_of_memory() {
        let mut executor = executor_with(&[0x6105]);

        let result = executor.execute(Command::Mem { start: 0xFF0, len: 64 }).unwrap();
        assert!(matches!(
            result,
            CommandResult::MemDump { start: 0xFF0, bytes } if bytes.len() == 16
        ));

        assert!(matches!(
            executor.execute(Command::Mem {
                start: 0x1000,
                len: 16
            }),
            Err(CommandError::ValueOutOfRange)
        ));
    }

    #[test]
    fn mem_dump_reads_loaded_rom_bytes() {
        let mut executor = executor_with(&[0x6105]);

        let result = executor.execute(Command::Mem { start: 0x200, len: 2 }).unwrap();
        assert!(matches!(
            result,
            CommandResult::MemDump { start: 0x200, bytes } if bytes == [0x61, 0x05]
        ));
    }

    #[test]
    fn quit_passes_through() {
        let mut executor = executor_with(&[0x6105]);

        assert!(matches!(
            executor.execute(Command::Quit),
            Ok(CommandResult::Quit)
        ));
    }

    #[test]
    fn step_surfaces_machine_errors() {
        let mut executor = executor_with(&[0x00EE]);

        assert!(matches!(
            executor.execute(Command::Step),
            Err(CommandError::Machine(MachineError::StackUnderflow))
        ));
    }
}
