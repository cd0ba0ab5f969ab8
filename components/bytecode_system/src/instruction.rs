//! Instruction encoding, operand decoding and disassembly

use crate::opcode::Opcode;
use std::fmt;
use thiserror::Error;

/// Failure to encode or decode an instruction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    /// A byte that is not an opcode was found where an opcode was expected
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),

    /// The input ends inside an instruction's operands
    #[error("truncated operands: need {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required by the operand widths
        needed: usize,
        /// Bytes left in the input
        available: usize,
    },

    /// An operand width other than 1 or 2 bytes
    #[error("unsupported operand width {0}")]
    UnsupportedWidth(usize),

    /// Wrong number of operands for the opcode
    #[error("{opcode} takes {expected} operands, got {got}")]
    OperandCount {
        /// Opcode being encoded
        opcode: Opcode,
        /// Operands the opcode takes
        expected: usize,
        /// Operands supplied
        got: usize,
    },

    /// An operand value too large for its width
    #[error("operand {value} does not fit in {width} bytes")]
    OperandOverflow {
        /// Offending value
        value: usize,
        /// Width in bytes
        width: usize,
    },
}

/// Decodes big-endian operands of the given widths from the start of `bytes`.
///
/// Returns the operand values and the number of bytes read.
///
/// # Errors
///
/// Fails with [`InstructionError::Truncated`] when `bytes` is shorter than the
/// widths require, and with [`InstructionError::UnsupportedWidth`] for a width
/// other than 1 or 2. Nothing is read past the end of `bytes`.
///
/// # Examples
///
/// ```
/// use bytecode_system::{read_operands, InstructionError};
///
/// assert_eq!(read_operands(&[2, 1], &[0x01, 0x02, 0x03]), Ok((vec![258, 3], 3)));
/// assert_eq!(
///     read_operands(&[2], &[0x01]),
///     Err(InstructionError::Truncated { needed: 2, available: 1 })
/// );
/// ```
pub fn read_operands(
    widths: &[usize],
    bytes: &[u8],
) -> Result<(Vec<usize>, usize), InstructionError> {
    if let Some(&width) = widths.iter().find(|&&w| w != 1 && w != 2) {
        return Err(InstructionError::UnsupportedWidth(width));
    }
    let needed: usize = widths.iter().sum();
    if bytes.len() < needed {
        return Err(InstructionError::Truncated {
            needed,
            available: bytes.len(),
        });
    }

    let mut operands = Vec::with_capacity(widths.len());
    let mut offset = 0;
    for &width in widths {
        let value = match width {
            1 => usize::from(bytes[offset]),
            _ => usize::from(u16::from_be_bytes([bytes[offset], bytes[offset + 1]])),
        };
        operands.push(value);
        offset += width;
    }
    Ok((operands, offset))
}

/// Encodes `opcode` followed by `operands`.
///
/// # Errors
///
/// Fails when the operand count does not match the opcode or a value does not
/// fit its width.
///
/// # Examples
///
/// ```
/// use bytecode_system::{make_instruction, Opcode};
///
/// let code = make_instruction(Opcode::Constant, &[65534]).unwrap();
/// assert_eq!(code, vec![Opcode::Constant as u8, 0xff, 0xfe]);
/// ```
pub fn make_instruction(opcode: Opcode, operands: &[usize]) -> Result<Vec<u8>, InstructionError> {
    let widths = opcode.operand_widths();
    if widths.len() != operands.len() {
        return Err(InstructionError::OperandCount {
            opcode,
            expected: widths.len(),
            got: operands.len(),
        });
    }

    let mut code = Vec::with_capacity(opcode.instruction_len());
    code.push(u8::from(opcode));
    for (&width, &value) in widths.iter().zip(operands) {
        let overflow = InstructionError::OperandOverflow { value, width };
        match width {
            1 => code.push(u8::try_from(value).map_err(|_| overflow)?),
            2 => {
                let v = u16::try_from(value).map_err(|_| overflow)?;
                code.extend_from_slice(&v.to_be_bytes());
            }
            w => return Err(InstructionError::UnsupportedWidth(w)),
        }
    }
    Ok(code)
}

/// A decoded instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The opcode
    pub opcode: Opcode,
    /// Operand values, one per operand width of the opcode
    pub operands: Vec<usize>,
}

impl Instruction {
    /// Decodes the instruction at the start of `bytes`.
    ///
    /// Returns the instruction and its encoded length.
    ///
    /// # Errors
    ///
    /// Fails on an empty input, an unknown opcode byte or truncated operands.
    pub fn decode(bytes: &[u8]) -> Result<(Instruction, usize), InstructionError> {
        let (&first, rest) = bytes.split_first().ok_or(InstructionError::Truncated {
            needed: 1,
            available: 0,
        })?;
        let opcode = Opcode::try_from(first).map_err(InstructionError::UnknownOpcode)?;
        let (operands, read) = read_operands(opcode.operand_widths(), rest)?;
        Ok((Instruction { opcode, operands }, 1 + read))
    }

    /// Encodes the instruction
    ///
    /// # Errors
    ///
    /// See [`make_instruction`].
    pub fn encode(&self) -> Result<Vec<u8>, InstructionError> {
        make_instruction(self.opcode, &self.operands)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operands.as_slice() {
            [] => write!(f, "{:<7}", self.opcode.name()),
            [a] => write!(f, "{:<7} {:<5}", self.opcode.name(), a),
            [a, b, ..] => write!(f, "{:<7} {:<5} {:<5}", self.opcode.name(), a, b),
        }
    }
}

/// Disassembles `code` one line per instruction. Offsets printed are relative
/// to `pos_offset`.
///
/// # Errors
///
/// Fails at the first unknown opcode or truncated instruction.
///
/// # Examples
///
/// ```
/// use bytecode_system::{format_instructions, make_instruction, Opcode};
///
/// let mut code = make_instruction(Opcode::Constant, &[1]).unwrap();
/// code.extend(make_instruction(Opcode::Pop, &[]).unwrap());
/// assert_eq!(
///     format_instructions(&code, 0).unwrap(),
///     vec!["0000 CONST   1    ", "0003 POP    "]
/// );
/// ```
pub fn format_instructions(code: &[u8], pos_offset: usize) -> Result<Vec<String>, InstructionError> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < code.len() {
        let (instruction, len) = Instruction::decode(&code[i..])?;
        out.push(format!("{:04} {}", pos_offset + i, instruction));
        i += len;
    }
    Ok(out)
}
