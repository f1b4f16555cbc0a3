/// Result type for a single CPU cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleResult {
    /// Keep executing instructions in the current frame.
    Continue,
    /// Hand control back to the host before running another cycle
    /// (after a draw, or while a key wait needs a fresh keypad snapshot).
    YieldFrame,
}

/// Errors surfaced by ROM loading and instruction execution.
///
/// Unknown opcodes are deliberately absent: they execute as no-ops,
/// since ROMs routinely carry data past the end of their code.
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("Program counter ran out of addressable memory at {pc:#06X}")]
    PcOutOfBounds { pc: u16 },

    #[error("Memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("Stack overflow: subroutine calls nested deeper than 16")]
    StackOverflow,

    #[error("Stack underflow: return executed with no subroutine call outstanding")]
    StackUnderflow,
}

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;
/// The 64x32 monochrome display buffer, row-major: indexed `[y][x]`.
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];
