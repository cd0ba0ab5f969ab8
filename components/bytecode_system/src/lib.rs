//! Bytecode instruction table for the script VM
//!
//! This crate defines the instruction set consumed by the compiler and VM:
//! opcode bytes, their mnemonics and operand widths, plus encoding, decoding
//! and disassembly of instruction streams.
//!
//! # Features
//!
//! - Byte-sized opcodes with fixed big-endian operands of 1 or 2 bytes
//! - Bounds-checked operand decoding
//! - Human readable disassembly
//!
//! # Example
//!
//! ```
//! use bytecode_system::{format_instructions, make_instruction, Instruction, Opcode};
//!
//! let mut code = make_instruction(Opcode::Constant, &[0]).unwrap();
//! code.extend(make_instruction(Opcode::Return, &[1]).unwrap());
//!
//! let (first, len) = Instruction::decode(&code).unwrap();
//! assert_eq!(first.opcode, Opcode::Constant);
//! assert_eq!(len, 3);
//!
//! // truncated streams are rejected instead of read past the end
//! assert!(Instruction::decode(&code[..2]).is_err());
//!
//! for line in format_instructions(&code, 0).unwrap() {
//!     println!("{}", line);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod instruction;
pub mod opcode;

// Re-export main types at crate root
pub use instruction::{
    format_instructions, make_instruction, read_operands, Instruction, InstructionError,
};
pub use opcode::Opcode;
