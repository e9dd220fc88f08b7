//! Bytecode walking: locating the constant pool operands of instructions.

use crate::error::{ClassFileError, Result};

const LDC: u8 = 0x12;
const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

/// A constant pool operand inside an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOperand {
    /// Offset of the operand bytes (not the opcode).
    pub offset: usize,
    /// `true` for the one-byte operand of `ldc`.
    pub narrow: bool,
}

/// Length of the fixed-size instruction `opcode`, or `None` for the
/// variable-length ones and undefined opcodes.
fn fixed_length(opcode: u8) -> Option<usize> {
    let len = match opcode {
        0x00..=0x0f | 0x1a..=0x35 | 0x3b..=0x83 | 0x85..=0x98 | 0xac..=0xb1 => 1,
        0xbe | 0xbf | 0xc2 | 0xc3 | 0xca | 0xfe | 0xff => 1,
        0x10 | 0x12 | 0x15..=0x19 | 0x36..=0x3a | 0xa9 | 0xbc => 2,
        0x11 | 0x13 | 0x14 | 0x84 | 0x99..=0xa8 | 0xb2..=0xb8 => 3,
        0xbb | 0xbd | 0xc0 | 0xc1 | 0xc6 | 0xc7 => 3,
        0xc5 => 4,
        0xb9 | 0xba | 0xc8 | 0xc9 => 5,
        _ => return None,
    };
    Some(len)
}

/// Opcodes whose first operand is a two-byte constant pool index.
fn has_wide_pool_operand(opcode: u8) -> bool {
    matches!(
        opcode,
        0x13 | 0x14 | 0xb2..=0xba | 0xbb | 0xbd | 0xc0 | 0xc1 | 0xc5
    )
}

fn read_i32(code: &[u8], at: usize) -> Result<i32> {
    let b = code
        .get(at..at + 4)
        .ok_or(ClassFileError::Truncated { offset: at, needed: 4 })?;
    Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Length of the instruction starting at `pc`.
fn instruction_length(code: &[u8], pc: usize) -> Result<usize> {
    let opcode = code[pc];
    if let Some(len) = fixed_length(opcode) {
        return Ok(len);
    }
    // Switch operands are 4-byte aligned relative to the start of the code.
    let padding = (4 - (pc + 1) % 4) % 4;
    let operands = pc + 1 + padding;
    match opcode {
        TABLESWITCH => {
            let low = read_i32(code, operands + 4)?;
            let high = read_i32(code, operands + 8)?;
            let count = usize::try_from(i64::from(high) - i64::from(low) + 1)
                .map_err(|_| ClassFileError::BadOpcode { opcode, offset: pc })?;
            Ok(1 + padding + 12 + count * 4)
        }
        LOOKUPSWITCH => {
            let pairs = usize::try_from(read_i32(code, operands + 4)?)
                .map_err(|_| ClassFileError::BadOpcode { opcode, offset: pc })?;
            Ok(1 + padding + 8 + pairs * 8)
        }
        WIDE => match code.get(pc + 1) {
            Some(&IINC) => Ok(6),
            Some(_) => Ok(4),
            None => Err(ClassFileError::Truncated { offset: pc + 1, needed: 1 }),
        },
        _ => Err(ClassFileError::BadOpcode { opcode, offset: pc }),
    }
}

/// Every constant pool operand in `code`, in instruction order.
pub fn pool_operands(code: &[u8]) -> Result<Vec<PoolOperand>> {
    let mut out = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let opcode = code[pc];
        let len = instruction_length(code, pc)?;
        if pc + len > code.len() {
            return Err(ClassFileError::Truncated {
                offset: pc,
                needed: pc + len - code.len(),
            });
        }
        if opcode == LDC {
            out.push(PoolOperand {
                offset: pc + 1,
                narrow: true,
            });
        } else if has_wide_pool_operand(opcode) {
            out.push(PoolOperand {
                offset: pc + 1,
                narrow: false,
            });
        }
        pc += len;
    }
    Ok(out)
}

/// Read the index stored at `operand`.
pub fn operand_value(code: &[u8], operand: PoolOperand) -> u16 {
    if operand.narrow {
        u16::from(code[operand.offset])
    } else {
        u16::from_be_bytes([code[operand.offset], code[operand.offset + 1]])
    }
}

/// Rewrite every constant pool operand of `code` through `map`.
///
/// Instruction lengths never change, so branch offsets and exception
/// ranges stay valid. A remapped `ldc` operand above 255 is an error.
pub fn remap_operands(code: &mut [u8], mut map: impl FnMut(u16) -> Result<u16>) -> Result<()> {
    for operand in pool_operands(code)? {
        let new = map(operand_value(code, operand))?;
        if operand.narrow {
            code[operand.offset] = u8::try_from(new)
                .map_err(|_| ClassFileError::PoolOverflow("ldc operand above 255"))?;
        } else {
            code[operand.offset..operand.offset + 2].copy_from_slice(&new.to_be_bytes());
        }
    }
    Ok(())
}
