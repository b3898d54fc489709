//! Instruction buffer for one method body.
//!
//! A flat byte sequence: each instruction is a one-byte opcode followed by
//! zero, one or two u16 little-endian operands. Forward jumps are emitted
//! with a placeholder target and patched once the target is known.

use crate::{EmitError, OpCode};

/// Position of a jump operand waiting to be patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(usize);

impl JumpLabel {
    /// Byte offset of the placeholder operand.
    pub fn offset(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstructionBuffer {
    code: Vec<u8>,
}

impl InstructionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Writing
    // ==========================================================================

    /// Emit an opcode with no operands.
    pub fn emit(&mut self, op: OpCode) {
        debug_assert_eq!(op.operand_count(), 0, "{} takes operands", op.name());
        self.code.push(op.into());
    }

    /// Emit an opcode with one operand.
    pub fn emit_u16(&mut self, op: OpCode, operand: u16) {
        debug_assert_eq!(op.operand_count(), 1, "{} takes one operand", op.name());
        self.code.push(op.into());
        self.write_u16(operand);
    }

    /// Emit an opcode with two operands.
    pub fn emit_u16_u16(&mut self, op: OpCode, first: u16, second: u16) {
        debug_assert_eq!(op.operand_count(), 2, "{} takes two operands", op.name());
        self.code.push(op.into());
        self.write_u16(first);
        self.write_u16(second);
    }

    fn write_u16(&mut self, value: u16) {
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    // ==========================================================================
    // Jumps
    // ==========================================================================

    /// Emit a jump whose target is not known yet.
    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        self.code.push(op.into());
        let offset = self.code.len();
        self.write_u16(0xFFFF);
        JumpLabel(offset)
    }

    /// Point a pending jump at the current end of the buffer.
    pub fn patch_jump(&mut self, label: JumpLabel) -> Result<(), EmitError> {
        let target = u16::try_from(self.code.len())
            .map_err(|_| EmitError::BodyTooLarge { size: self.code.len() })?;
        self.code[label.0..label.0 + 2].copy_from_slice(&target.to_le_bytes());
        Ok(())
    }

    // ==========================================================================
    // Reading
    // ==========================================================================

    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn read_op(&self, offset: usize) -> Option<OpCode> {
        self.code.get(offset).and_then(|&b| OpCode::from_u8(b))
    }

    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let bytes = self.code.get(offset..offset + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Extract all opcodes, skipping operands.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut ops = Vec::new();
        let mut offset = 0;

        while offset < self.code.len() {
            if let Some(op) = self.read_op(offset) {
                ops.push(op);
                offset += 1 + op.operand_size();
            } else {
                offset += 1;
            }
        }

        ops
    }

    /// Check that the buffer holds exactly the given opcode sequence,
    /// ignoring operands.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_are_little_endian() {
        let mut buffer = InstructionBuffer::new();
        buffer.emit_u16(OpCode::LoadConst, 0x1234);
        buffer.emit_u16_u16(OpCode::Call, 7, 2);

        assert_eq!(buffer.code(), &[0x20, 0x34, 0x12, 0x40, 7, 0, 2, 0]);
        assert_eq!(buffer.read_u16(1), Some(0x1234));
    }

    #[test]
    fn emit_and_patch_jump() {
        let mut buffer = InstructionBuffer::new();
        buffer.emit(OpCode::LoadTrue);
        let label = buffer.emit_jump(OpCode::JmpFalse);
        assert_eq!(buffer.read_u16(label.offset()), Some(0xFFFF));

        buffer.emit(OpCode::LoadNull);
        buffer.emit(OpCode::Pop);
        buffer.patch_jump(label).unwrap();

        // absolute target: LOAD_TRUE(1) + JMP_FALSE(3) + LOAD_NULL(1) + POP(1)
        assert_eq!(buffer.read_u16(label.offset()), Some(6));
    }

    #[test]
    fn opcodes_skip_operands() {
        let mut buffer = InstructionBuffer::new();
        buffer.emit_u16(OpCode::LoadLocal, 1);
        buffer.emit_u16_u16(OpCode::CallNative, 1, 1);
        buffer.emit(OpCode::Pop);
        buffer.emit(OpCode::LoadNull);
        buffer.emit(OpCode::Ret);

        buffer.assert_opcodes(&[
            OpCode::LoadLocal,
            OpCode::CallNative,
            OpCode::Pop,
            OpCode::LoadNull,
            OpCode::Ret,
        ]);
    }

    #[test]
    #[should_panic(expected = "Bytecode mismatch")]
    fn assert_opcodes_failure() {
        let mut buffer = InstructionBuffer::new();
        buffer.emit(OpCode::Ret);
        buffer.assert_opcodes(&[OpCode::Pop]);
    }

    #[test]
    fn read_out_of_bounds() {
        let buffer = InstructionBuffer::new();
        assert_eq!(buffer.read_op(0), None);
        assert_eq!(buffer.read_u16(0), None);
    }
}
