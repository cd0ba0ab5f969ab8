//! Instruction table contract seen from a code generator

use bytecode_system::{format_instructions, make_instruction, Instruction, InstructionError, Opcode};

fn max_operands(op: Opcode) -> Vec<usize> {
    op.operand_widths()
        .iter()
        .map(|w| (1usize << (8 * w)) - 1)
        .collect()
}

fn program() -> (Vec<u8>, Vec<usize>) {
    let mut code = Vec::new();
    let mut starts = Vec::new();
    for op in Opcode::ALL {
        starts.push(code.len());
        code.extend(make_instruction(*op, &max_operands(*op)).unwrap());
    }
    (code, starts)
}

#[test]
fn test_every_opcode_encodes_to_its_length() {
    for op in Opcode::ALL {
        let code = make_instruction(*op, &max_operands(*op)).unwrap();
        assert_eq!(code.len(), op.instruction_len(), "{}", op);

        let (decoded, len) = Instruction::decode(&code).unwrap();
        assert_eq!(len, code.len());
        assert_eq!(decoded.opcode, *op);
        assert_eq!(decoded.operands, max_operands(*op));
    }
}

#[test]
fn test_disassembly_walks_the_whole_stream() {
    let (code, starts) = program();
    let lines = format_instructions(&code, 0).unwrap();

    assert_eq!(lines.len(), Opcode::ALL.len());
    for ((line, start), op) in lines.iter().zip(&starts).zip(Opcode::ALL) {
        assert!(line.starts_with(&format!("{:04} {}", start, op.name())), "{}", line);
    }
}

#[test]
fn test_every_cut_point_is_rejected_cleanly() {
    let (code, starts) = program();
    for cut in 0..code.len() {
        let result = format_instructions(&code[..cut], 0);
        if starts.contains(&cut) {
            assert!(result.is_ok(), "cut at instruction boundary {}", cut);
        } else {
            assert!(
                matches!(result, Err(InstructionError::Truncated { .. })),
                "cut {} gave {:?}",
                cut,
                result
            );
        }
    }
}
