use crate::u4;

/// A decoded CHIP-8 instruction.
///
/// The operand fields (x, y, n, kk, nnn) are the bit fields encoded in the
/// 16-bit opcode. Decoding never fails: patterns outside the instruction
/// set become [`Instruction::Unknown`], which executes as a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - Clear the display.
    ClearScreen,
    /// 00EE - Return from a subroutine.
    Return,
    /// 1nnn - Jump to address nnn.
    Jump { nnn: u16 },
    /// 2nnn - Call the subroutine at nnn.
    Call { nnn: u16 },

    /// 3xkk - Skip the next instruction if Vx == kk.
    SkipEqImm { x: u4, kk: u8 },
    /// 4xkk - Skip the next instruction if Vx != kk.
    SkipNeImm { x: u4, kk: u8 },
    /// 5xy0 - Skip the next instruction if Vx == Vy.
    SkipEqReg { x: u4, y: u4 },
    /// 9xy0 - Skip the next instruction if Vx != Vy.
    SkipNeReg { x: u4, y: u4 },

    /// 6xkk - Set Vx = kk.
    LoadImm { x: u4, kk: u8 },
    /// 7xkk - Set Vx = Vx + kk, without touching the carry flag.
    AddImm { x: u4, kk: u8 },
    /// 8xyN - Register-to-register ALU operation, selected by N.
    Alu { x: u4, y: u4, op: AluOp },
    /// Cxkk - Set Vx = random byte AND kk.
    Random { x: u4, kk: u8 },

    /// Annn - Set I = nnn.
    LoadIndex { nnn: u16 },
    /// Bnnn - Jump to address nnn + V0.
    JumpV0 { nnn: u16 },
    /// Fx1E - Set I = I + Vx.
    AddIndex { x: u4 },
    /// Fx29 - Point I at the built-in sprite for the digit in Vx.
    FontDigit { x: u4 },

    /// Dxyn - Draw the n-byte sprite at I to (Vx, Vy), set VF on collision.
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E - Skip the next instruction if the key indexed by Vx is down.
    SkipKeyDown { x: u4 },
    /// ExA1 - Skip the next instruction if the key indexed by Vx is up.
    SkipKeyUp { x: u4 },
    /// Fx0A - Wait for a key press, store the key index in Vx.
    WaitKey { x: u4 },

    /// Fx07 - Set Vx = delay timer.
    ReadDelay { x: u4 },
    /// Fx15 - Set delay timer = Vx.
    SetDelay { x: u4 },
    /// Fx18 - Set sound timer = Vx.
    SetSound { x: u4 },

    /// Fx33 - Store the BCD digits of Vx at I, I+1 and I+2.
    StoreBcd { x: u4 },
    /// Fx55 - Store V0 through Vx to memory starting at I.
    SaveRegs { x: u4 },
    /// Fx65 - Fill V0 through Vx from memory starting at I.
    FillRegs { x: u4 },

    /// Any pattern outside the instruction set, kept for diagnostics.
    Unknown(u16),
}

/// The nine 8xyN ALU operations, named after their classic mnemonics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// 8xy0 - Vx = Vy
    Load,
    /// 8xy1 - Vx = Vx OR Vy
    Or,
    /// 8xy2 - Vx = Vx AND Vy
    And,
    /// 8xy3 - Vx = Vx XOR Vy
    Xor,
    /// 8xy4 - Vx = Vx + Vy, VF = carry
    Add,
    /// 8xy5 - Vx = Vx - Vy, VF = 1 if Vx > Vy
    Sub,
    /// 8xy6 - Vx = Vx >> 1, VF = shifted-out bit
    Shr,
    /// 8xy7 - Vx = Vy - Vx, VF = 1 if Vy > Vx
    Subn,
    /// 8xyE - Vx = Vx << 1, VF = shifted-out bit
    Shl,
}

impl Instruction {
    /// Decodes a raw 16-bit opcode.
    ///
    /// The top nibble selects the instruction family; the 0x0, 0x8, 0xE
    /// and 0xF families dispatch further on a secondary key (the low
    /// address bits, the low nibble, or the low byte).
    pub fn decode(raw: u16) -> Self {
        let x = u4::new(((raw >> 8) & 0xF) as u8);
        let y = u4::new(((raw >> 4) & 0xF) as u8);
        let n = u4::new((raw & 0xF) as u8);
        let kk = (raw & 0xFF) as u8;
        let nnn = raw & 0xFFF;

        match (raw >> 12) & 0xF {
            0x0 => match nnn {
                0x0E0 => Instruction::ClearScreen,
                0x0EE => Instruction::Return,
                // 0nnn machine language routines are not supported.
                _ => Instruction::Unknown(raw),
            },
            0x1 => Instruction::Jump { nnn },
            0x2 => Instruction::Call { nnn },
            0x3 => Instruction::SkipEqImm { x, kk },
            0x4 => Instruction::SkipNeImm { x, kk },
            0x5 if raw & 0xF == 0 => Instruction::SkipEqReg { x, y },
            0x6 => Instruction::LoadImm { x, kk },
            0x7 => Instruction::AddImm { x, kk },
            0x8 => {
                let op = match raw & 0xF {
                    0x0 => AluOp::Load,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::Shr,
                    0x7 => AluOp::Subn,
                    0xE => AluOp::Shl,
                    _ => return Instruction::Unknown(raw),
                };
                Instruction::Alu { x, y, op }
            }
            0x9 if raw & 0xF == 0 => Instruction::SkipNeReg { x, y },
            0xA => Instruction::LoadIndex { nnn },
            0xB => Instruction::JumpV0 { nnn },
            0xC => Instruction::Random { x, kk },
            0xD => Instruction::Draw { x, y, n },
            0xE => match kk {
                0x9E => Instruction::SkipKeyDown { x },
                0xA1 => Instruction::SkipKeyUp { x },
                _ => Instruction::Unknown(raw),
            },
            0xF => match kk {
                0x07 => Instruction::ReadDelay { x },
                0x0A => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::FontDigit { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::SaveRegs { x },
                0x65 => Instruction::FillRegs { x },
                _ => Instruction::Unknown(raw),
            },
            _ => Instruction::Unknown(raw),
        }
    }
}
