use crate::u4;
use crate::vm::{
    CycleResult, DISPLAY_X, DISPLAY_Y, Display, FONT, FONT_END_ADDRESS, FONT_START_ADDRESS,
    Instruction, MachineError,
};

pub const MEMORY_SIZE: usize = 4096;
pub const ROM_START_ADDRESS: u16 = 0x200;
pub const STACK_SIZE: usize = 16;

/// The complete CHIP-8 machine state.
///
/// Holds memory, registers, the call stack, timers, the display and the
/// keypad. [`Machine::cycle`] advances execution by one instruction;
/// [`Machine::tick_timers`] is driven separately at 60 Hz by the caller.
pub struct Machine {
    pub(crate) memory: [u8; MEMORY_SIZE],
    pub(crate) display: Display<bool>,
    pub(crate) pc: u16,
    pub(crate) i: u16,
    pub(crate) v: [u8; 16],
    pub(crate) stack: [u16; STACK_SIZE],
    pub(crate) sp: usize,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) keypad: [bool; 16],
}

impl Machine {
    /// Creates a machine with the font sprites installed and the program
    /// counter at the ROM entry point.
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[FONT_START_ADDRESS..FONT_END_ADDRESS].copy_from_slice(&FONT);

        Self {
            memory,
            display: [[false; DISPLAY_X]; DISPLAY_Y],
            pc: ROM_START_ADDRESS,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_SIZE],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; 16],
        }
    }

    /// Copies a ROM image into memory at the entry point.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), MachineError> {
        let max_size = MEMORY_SIZE - ROM_START_ADDRESS as usize;
        if rom.len() > max_size {
            return Err(MachineError::RomTooLarge {
                size: rom.len(),
                max_size,
            });
        }

        self.memory[ROM_START_ADDRESS as usize..][..rom.len()].copy_from_slice(rom);
        Ok(())
    }

    /// Runs one fetch-decode-execute cycle.
    pub fn cycle(&mut self) -> Result<CycleResult, MachineError> {
        let raw = self.fetch()?;
        let instruction = Instruction::decode(raw);
        self.execute(instruction)
    }

    /// Reads the big-endian instruction word at pc and advances pc past it.
    ///
    /// Skips and jumps in the execute stage work against the already
    /// advanced pc, and the key wait rewinds it.
    fn fetch(&mut self) -> Result<u16, MachineError> {
        let pc = self.pc as usize;
        if pc + 1 >= MEMORY_SIZE {
            return Err(MachineError::PcOutOfBounds { pc: self.pc });
        }

        let raw = u16::from_be_bytes([self.memory[pc], self.memory[pc + 1]]);
        self.pc += 2;
        Ok(raw)
    }

    /// Decrements both timers, holding them at zero.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Whether the buzzer should currently sound.
    pub fn should_beep(&self) -> bool {
        self.sound_timer > 0
    }

    /// Sets the pressed state of a single key.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    /// Replaces the whole keypad state at once.
    pub fn set_keypad(&mut self, keypad: [bool; 16]) {
        self.keypad = keypad;
    }

    pub(crate) fn mem_read(&self, address: u16) -> Result<u8, MachineError> {
        self.memory
            .get(address as usize)
            .copied()
            .ok_or(MachineError::MemoryOutOfBounds { address })
    }

    pub(crate) fn mem_mut(&mut self, address: u16) -> Result<&mut u8, MachineError> {
        self.memory
            .get_mut(address as usize)
            .ok_or(MachineError::MemoryOutOfBounds { address })
    }

    pub(crate) fn stack_push(&mut self, address: u16) -> Result<(), MachineError> {
        if self.sp >= STACK_SIZE {
            return Err(MachineError::StackOverflow);
        }

        self.stack[self.sp] = address;
        self.sp += 1;
        Ok(())
    }

    pub(crate) fn stack_pop(&mut self) -> Result<u16, MachineError> {
        if self.sp == 0 {
            return Err(MachineError::StackUnderflow);
        }

        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    pub fn display(&self) -> &Display<bool> {
        &self.display
    }

    /// Reads one display pixel; `y` is the row, `x` the column.
    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.display[y][x]
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    /// The in-use portion of the call stack, innermost frame last.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn keypad(&self) -> &[bool; 16] {
        &self.keypad
    }

    pub fn memory(&self) -> &[u8; MEMORY_SIZE] {
        &self.memory
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
