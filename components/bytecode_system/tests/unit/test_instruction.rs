//! Tests for instruction encoding and disassembly

use bytecode_system::{
    format_instructions, make_instruction, read_operands, Instruction, InstructionError, Opcode,
};
use proptest::prelude::*;

#[test]
fn test_two_byte_operands_are_big_endian() {
    let code = make_instruction(Opcode::Jump, &[0x0102]).unwrap();
    assert_eq!(code, vec![Opcode::Jump as u8, 0x01, 0x02]);
    assert_eq!(read_operands(&[2], &code[1..]), Ok((vec![0x0102], 2)));
}

#[test]
fn test_operand_limits() {
    assert!(make_instruction(Opcode::Constant, &[u16::MAX as usize]).is_ok());
    assert_eq!(
        make_instruction(Opcode::Constant, &[u16::MAX as usize + 1]),
        Err(InstructionError::OperandOverflow {
            value: 65536,
            width: 2
        })
    );
    assert!(make_instruction(Opcode::GetLocal, &[255]).is_ok());
}

#[test]
fn test_disassembly_of_a_small_program() {
    // a := [1, 2]; a[0]
    let program: &[(Opcode, &[usize])] = &[
        (Opcode::Constant, &[0]),
        (Opcode::Constant, &[1]),
        (Opcode::Array, &[2]),
        (Opcode::DefineLocal, &[0]),
        (Opcode::GetLocal, &[0]),
        (Opcode::Constant, &[2]),
        (Opcode::Index, &[]),
        (Opcode::Pop, &[]),
        (Opcode::Suspend, &[]),
    ];
    let mut code = Vec::new();
    for (op, operands) in program {
        code.extend(make_instruction(*op, operands).unwrap());
    }

    let lines = format_instructions(&code, 0).unwrap();
    assert_eq!(lines.len(), program.len());
    assert_eq!(lines[0], "0000 CONST   0    ");
    assert_eq!(lines[2], "0006 ARR     2    ");
    assert_eq!(lines[3], "0009 DEFL    0    ");
    assert_eq!(lines[6], "0016 INDEX  ");
    assert_eq!(lines[8], "0018 SUSPEND");
}

#[test]
fn test_decode_every_opcode() {
    for op in Opcode::ALL {
        let operands: Vec<usize> = op.operand_widths().iter().map(|w| w * 10).collect();
        let code = make_instruction(*op, &operands).unwrap();
        let (inst, len) = Instruction::decode(&code).unwrap();
        assert_eq!(len, code.len());
        assert_eq!(inst, Instruction { opcode: *op, operands });
    }
}

#[test]
fn test_instruction_display() {
    let inst = Instruction {
        opcode: Opcode::SetSelLocal,
        operands: vec![3, 2],
    };
    assert_eq!(inst.to_string(), "SETSL   3     2    ");
}

#[test]
fn test_every_proper_prefix_is_rejected() {
    for op in Opcode::ALL {
        let operands: Vec<usize> = op.operand_widths().iter().map(|_| 1).collect();
        let code = make_instruction(*op, &operands).unwrap();
        for keep in 0..code.len() {
            assert!(
                matches!(
                    Instruction::decode(&code[..keep]),
                    Err(InstructionError::Truncated { .. })
                ),
                "{} cut to {} bytes",
                op,
                keep
            );
        }
        assert!(Instruction::decode(&code).is_ok());
    }
}

proptest! {
    #[test]
    fn prop_decoding_never_reads_past_input(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut offset = 0;
        while offset < bytes.len() {
            match Instruction::decode(&bytes[offset..]) {
                Ok((_, len)) => {
                    prop_assert!(len >= 1);
                    prop_assert!(offset + len <= bytes.len());
                    offset += len;
                }
                Err(InstructionError::UnknownOpcode(b)) => {
                    prop_assert_eq!(b, bytes[offset]);
                    break;
                }
                Err(InstructionError::Truncated { needed, available }) => {
                    prop_assert!(available < needed);
                    prop_assert_eq!(available, bytes.len() - offset - 1);
                    break;
                }
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }
}
