use crate::u4;
use crate::vm::{CycleResult, Machine, MachineError};
use std::collections::HashSet;

const CPU_HZ: f32 = 700.0;
const TIMER_HZ: f32 = 60.0;

const CPU_TIME_STEP: f32 = 1.0 / CPU_HZ;
const TIMER_TIME_STEP: f32 = 1.0 / TIMER_HZ;

/// Drives a [`Machine`] in real time.
///
/// Owns the cycle and timer cadence: CPU cycles at 700 Hz, timer ticks at
/// 60 Hz, both derived from the wall-clock delta the host passes in.
pub struct Runner {
    machine: Machine,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

pub enum RunnerResult {
    HitBreakpoint,
    Ok,
}

impl Runner {
    pub fn new(machine: Machine) -> Self {
        Self {
            machine,
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Advances the machine by the elapsed time `dt`.
    ///
    /// Runs as many timer ticks and CPU cycles as the elapsed time calls
    /// for. Returns early when a cycle yields a frame boundary.
    pub fn update(&mut self, dt: f32) -> Result<RunnerResult, MachineError> {
        self.update_with_breakpoints(dt, None)
    }

    /// Like `update`, but pauses when pc lands on a breakpoint.
    pub fn update_with_breakpoints(
        &mut self,
        dt: f32,
        breakpoints: Option<&HashSet<u16>>,
    ) -> Result<RunnerResult, MachineError> {
        self.cpu_dt_accumulator += dt;
        self.timer_dt_accumulator += dt;

        while self.timer_dt_accumulator >= TIMER_TIME_STEP {
            self.timer_dt_accumulator -= TIMER_TIME_STEP;
            self.machine.tick_timers();
        }

        while self.cpu_dt_accumulator >= CPU_TIME_STEP {
            self.cpu_dt_accumulator -= CPU_TIME_STEP;

            let cycle_result = self.machine.cycle()?;

            if let Some(breakpoints) = &breakpoints
                && breakpoints.contains(&self.machine.pc)
            {
                self.cpu_dt_accumulator = 0.0;
                return Ok(RunnerResult::HitBreakpoint);
            }

            match cycle_result {
                CycleResult::YieldFrame => {
                    // Stop running cycles until the host has rendered.
                    // Clearing the accumulator avoids catching up next frame.
                    self.cpu_dt_accumulator = 0.0;
                    break;
                }
                CycleResult::Continue => {}
            }
        }

        Ok(RunnerResult::Ok)
    }

    /// Whether the sound timer is active and a beep should be playing.
    pub fn should_beep(&self) -> bool {
        self.machine.should_beep()
    }

    /// Sets the pressed state of one keypad key.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.machine.set_key(key, pressed)
    }

    /// Replaces the whole keypad snapshot.
    pub fn set_keypad(&mut self, keypad: [bool; 16]) {
        self.machine.set_keypad(keypad)
    }

    /// Reads one display pixel (true = lit).
    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.machine.pixel(y, x)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }
}
