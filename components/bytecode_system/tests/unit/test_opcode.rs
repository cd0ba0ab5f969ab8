//! Tests for the opcode table

use bytecode_system::Opcode;

#[test]
fn test_mnemonics_in_byte_order() {
    let names: Vec<&str> = Opcode::ALL.iter().map(|op| op.name()).collect();
    assert_eq!(
        names,
        vec![
            "CONST", "COMPL", "POP", "TRUE", "FALSE", "EQL", "NEQ", "NEG", "NOT", "JMPF",
            "ANDJMP", "ORJMP", "JMP", "NULL", "ARR", "MAP", "ERROR", "IMMUT", "INDEX", "SLICE",
            "CALL", "RET", "GETG", "SETG", "SETSG", "GETL", "SETL", "DEFL", "SETSL", "GETFP",
            "GETF", "SETF", "GETLP", "SETSF", "BUILTIN", "CLOSURE", "ITER", "ITNXT", "ITKEY",
            "ITVAL", "BINARYOP", "SUSPEND",
        ]
    );
}

#[test]
fn test_mnemonics_fit_the_disassembly_column() {
    for op in Opcode::ALL {
        assert!(op.name().len() <= 8, "{} is too long", op);
    }
}

#[test]
fn test_operand_widths() {
    let cases: &[(Opcode, &[usize])] = &[
        (Opcode::Constant, &[2]),
        (Opcode::JumpFalsy, &[2]),
        (Opcode::Array, &[2]),
        (Opcode::Call, &[1, 1]),
        (Opcode::Return, &[1]),
        (Opcode::SetSelGlobal, &[2, 1]),
        (Opcode::SetSelLocal, &[1, 1]),
        (Opcode::Closure, &[2, 1]),
        (Opcode::BinaryOp, &[1]),
        (Opcode::IteratorNext, &[]),
    ];
    for (op, widths) in cases {
        assert_eq!(op.operand_widths(), *widths, "{}", op);
        assert_eq!(op.instruction_len(), 1 + widths.iter().sum::<usize>());
    }
}

#[test]
fn test_byte_conversions() {
    for op in Opcode::ALL {
        let byte = u8::from(*op);
        assert_eq!(Opcode::try_from(byte), Ok(*op));
    }
    for byte in 42u8..=255 {
        assert_eq!(Opcode::from_byte(byte), None);
    }
}
