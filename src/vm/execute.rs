use crate::u4;
use crate::vm::{
    AluOp, CycleResult, DISPLAY_X, DISPLAY_Y, FONT_START_ADDRESS, Instruction, Machine,
    MachineError,
};

impl Machine {
    /// Executes one decoded instruction.
    ///
    /// The fetch stage has already advanced pc past this instruction, so
    /// skips add another 2, jumps overwrite it, and the key wait rewinds it.
    pub(crate) fn execute(
        &mut self,
        instruction: Instruction,
    ) -> Result<CycleResult, MachineError> {
        match instruction {
            Instruction::ClearScreen => {
                self.display = [[false; DISPLAY_X]; DISPLAY_Y];
            }
            Instruction::Jump { nnn } => {
                self.pc = nnn;
            }
            Instruction::JumpV0 { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Instruction::Call { nnn } => {
                self.stack_push(self.pc)?;
                self.pc = nnn;
            }
            Instruction::Return => {
                self.pc = self.stack_pop()?;
            }
            Instruction::SkipEqImm { x, kk } => {
                if self.v[x] == kk {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instruction::SkipNeImm { x, kk } => {
                if self.v[x] != kk {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instruction::SkipEqReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instruction::SkipNeReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instruction::LoadImm { x, kk } => {
                self.v[x] = kk;
            }
            Instruction::AddImm { x, kk } => {
                self.v[x] = self.v[x].wrapping_add(kk);
            }
            Instruction::Alu { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Instruction::Random { x, kk } => {
                let rand_byte: u8 = rand::random();
                self.v[x] = rand_byte & kk;
            }
            Instruction::LoadIndex { nnn } => {
                self.i = nnn;
            }
            Instruction::AddIndex { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Instruction::Draw { x, y, n } => {
                return self.execute_draw(x, y, n);
            }
            Instruction::SkipKeyDown { x } => {
                if self.keypad[self.v[x] as usize & 0x0F] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instruction::SkipKeyUp { x } => {
                if !self.keypad[self.v[x] as usize & 0x0F] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Instruction::WaitKey { x } => {
                return Ok(self.execute_wait_key(x));
            }
            Instruction::ReadDelay { x } => {
                self.v[x] = self.delay_timer;
            }
            Instruction::SetDelay { x } => {
                self.delay_timer = self.v[x];
            }
            Instruction::SetSound { x } => {
                self.sound_timer = self.v[x];
            }
            Instruction::FontDigit { x } => {
                let digit = self.v[x] & 0x0F;
                self.i = FONT_START_ADDRESS as u16 + digit as u16 * 5;
            }
            Instruction::StoreBcd { x } => {
                let value = self.v[x];
                *self.mem_mut(self.i)? = value / 100;
                *self.mem_mut(self.i.wrapping_add(1))? = (value / 10) % 10;
                *self.mem_mut(self.i.wrapping_add(2))? = value % 10;
            }
            Instruction::SaveRegs { x } => {
                for offset in 0..=usize::from(x) {
                    *self.mem_mut(self.i.wrapping_add(offset as u16))? = self.v[offset];
                }
            }
            Instruction::FillRegs { x } => {
                for offset in 0..=usize::from(x) {
                    self.v[offset] = self.mem_read(self.i.wrapping_add(offset as u16))?;
                }
            }
            Instruction::Unknown(_) => {
                // Defined as a no-op, pc has already moved past it.
            }
        };

        Ok(CycleResult::Continue)
    }

    /// The 8xyN group. Both operands are read before VF is written, so an
    /// operand aliasing VF sees its original value; the result is stored
    /// last, so an operation targeting VF keeps the arithmetic result.
    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        match op {
            AluOp::Load => {
                self.v[x] = self.v[y];
            }
            AluOp::Or => {
                self.v[x] |= self.v[y];
            }
            AluOp::And => {
                self.v[x] &= self.v[y];
            }
            AluOp::Xor => {
                self.v[x] ^= self.v[y];
            }
            AluOp::Add => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[0xF] = carry as u8;
                self.v[x] = sum;
            }
            AluOp::Sub => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[0xF] = (vx > vy) as u8;
                self.v[x] = vx.wrapping_sub(vy);
            }
            AluOp::Subn => {
                let (vx, vy) = (self.v[x], self.v[y]);
                self.v[0xF] = (vy > vx) as u8;
                self.v[x] = vy.wrapping_sub(vx);
            }
            AluOp::Shr => {
                let vx = self.v[x];
                self.v[0xF] = vx & 1;
                self.v[x] = vx >> 1;
            }
            AluOp::Shl => {
                let vx = self.v[x];
                self.v[0xF] = (vx >> 7) & 1;
                self.v[x] = vx << 1;
            }
        }
    }

    /// Dxyn. The origin wraps around the screen, pixels past the right or
    /// bottom edge clip. VF reports whether any lit pixel was turned off.
    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Result<CycleResult, MachineError> {
        let x0 = self.v[x] as usize % DISPLAY_X;
        let y0 = self.v[y] as usize % DISPLAY_Y;
        self.v[0xF] = 0;

        let rows = std::cmp::min(usize::from(n), DISPLAY_Y - y0);
        let cols = std::cmp::min(8, DISPLAY_X - x0);

        for row in 0..rows {
            let sprite_byte = self.mem_read(self.i.wrapping_add(row as u16))?;

            for col in 0..cols {
                if sprite_byte & (0x80 >> col) != 0 {
                    let pixel = &mut self.display[y0 + row][x0 + col];
                    if *pixel {
                        self.v[0xF] = 1;
                    }
                    *pixel ^= true;
                }
            }
        }

        Ok(CycleResult::YieldFrame)
    }

    /// Fx0A. Completes on the first cycle where any key is down; otherwise
    /// rewinds pc so the same instruction runs against the next keypad
    /// snapshot. Key 0 is a valid result, so presence is signaled by the
    /// scan itself rather than by a register value.
    fn execute_wait_key(&mut self, x: u4) -> CycleResult {
        match self.keypad.iter().position(|&down| down) {
            Some(key) => {
                self.v[x] = key as u8;
                CycleResult::Continue
            }
            None => {
                self.pc = self.pc.wrapping_sub(2);
                CycleResult::YieldFrame
            }
        }
    }
}
