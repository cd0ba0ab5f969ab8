//! Bytecode opcodes for the script VM
//!
//! Every opcode is a single byte followed by a fixed list of big-endian
//! operands. The operand widths of each opcode are part of the table below.

use std::fmt;

macro_rules! opcodes {
    ($(
        $(#[$doc:meta])*
        $variant:ident = $byte:literal, $name:literal, [$($width:literal),*];
    )*) => {
        /// Stack machine instruction set
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $variant = $byte,
            )*
        }

        impl Opcode {
            /// Every opcode in byte order
            pub const ALL: &'static [Opcode] = &[$(Opcode::$variant),*];

            /// Looks up the opcode encoded as `byte`
            pub fn from_byte(byte: u8) -> Option<Opcode> {
                match byte {
                    $($byte => Some(Opcode::$variant),)*
                    _ => None,
                }
            }

            /// Mnemonic used in disassembly
            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => $name,)*
                }
            }

            /// Byte width of each operand, in order
            pub fn operand_widths(self) -> &'static [usize] {
                match self {
                    $(Opcode::$variant => &[$($width),*],)*
                }
            }
        }
    };
}

opcodes! {
    /// Push a constant by index
    Constant = 0, "CONST", [2];
    /// Bitwise complement
    BComplement = 1, "COMPL", [];
    /// Discard the top of the stack
    Pop = 2, "POP", [];
    /// Push `true`
    True = 3, "TRUE", [];
    /// Push `false`
    False = 4, "FALSE", [];
    /// Equality test
    Equal = 5, "EQL", [];
    /// Inequality test
    NotEqual = 6, "NEQ", [];
    /// Arithmetic negation
    Minus = 7, "NEG", [];
    /// Logical not
    LNot = 8, "NOT", [];
    /// Jump if the popped value is falsy
    JumpFalsy = 9, "JMPF", [2];
    /// Short-circuit `&&`
    AndJump = 10, "ANDJMP", [2];
    /// Short-circuit `||`
    OrJump = 11, "ORJMP", [2];
    /// Unconditional jump
    Jump = 12, "JMP", [2];
    /// Push `undefined`
    Null = 13, "NULL", [];
    /// Build an array from the top N values
    Array = 14, "ARR", [2];
    /// Build a map from the top N values
    Map = 15, "MAP", [2];
    /// Wrap the top value in an error
    Error = 16, "ERROR", [];
    /// Make the top value immutable
    Immutable = 17, "IMMUT", [];
    /// Index access
    Index = 18, "INDEX", [];
    /// Slice access
    SliceIndex = 19, "SLICE", [];
    /// Call with N arguments; second operand flags a spread call
    Call = 20, "CALL", [1, 1];
    /// Return N values
    Return = 21, "RET", [1];
    /// Read a global
    GetGlobal = 22, "GETG", [2];
    /// Write a global
    SetGlobal = 23, "SETG", [2];
    /// Write through N selectors of a global
    SetSelGlobal = 24, "SETSG", [2, 1];
    /// Read a local
    GetLocal = 25, "GETL", [1];
    /// Write a local
    SetLocal = 26, "SETL", [1];
    /// Define a local
    DefineLocal = 27, "DEFL", [1];
    /// Write through N selectors of a local
    SetSelLocal = 28, "SETSL", [1, 1];
    /// Push a pointer to a free variable
    GetFreePtr = 29, "GETFP", [1];
    /// Read a free variable
    GetFree = 30, "GETF", [1];
    /// Write a free variable
    SetFree = 31, "SETF", [1];
    /// Push a pointer to a local
    GetLocalPtr = 32, "GETLP", [1];
    /// Write through N selectors of a free variable
    SetSelFree = 33, "SETSF", [1, 1];
    /// Push a builtin function
    GetBuiltin = 34, "BUILTIN", [1];
    /// Build a closure over N free variables
    Closure = 35, "CLOSURE", [2, 1];
    /// Start iterating the top value
    IteratorInit = 36, "ITER", [];
    /// Advance an iterator
    IteratorNext = 37, "ITNXT", [];
    /// Current iterator key
    IteratorKey = 38, "ITKEY", [];
    /// Current iterator value
    IteratorValue = 39, "ITVAL", [];
    /// Binary operation selected by token
    BinaryOp = 40, "BINARYOP", [1];
    /// Suspend the VM
    Suspend = 41, "SUSPEND", [];
}

impl Opcode {
    /// Encoded length of the instruction: one opcode byte plus its operands
    pub fn instruction_len(self) -> usize {
        1 + self.operand_widths().iter().sum::<usize>()
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Opcode::from_byte(byte).ok_or(byte)
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
