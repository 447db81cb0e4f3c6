// slip-compiler - Bytecode instruction definitions for Slip
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode instruction definitions.

/// Bytecode instructions for the Slip VM.
///
/// Every instruction occupies two bytes in a code buffer: the opcode byte
/// followed by a one-byte operand (zero when unused). Operand bytes index
/// the owning script's intern tables, which are therefore capped at 256
/// entries each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
    /// Terminate execution.
    Halt = 0,

    /// Pop a value into the current frame's variable slot.
    Def,

    /// As `Def`, but only when the slot is still unset; otherwise the stack
    /// is left untouched.
    Defonce,

    /// Pop a value and assign through the frame chain, falling back to the
    /// globals map when no frame holds the variable.
    Set,

    /// Bind a function value to its own name in the current frame.
    Defun,

    /// Call the value sitting beneath the operand's worth of arguments.
    /// The operand counts arguments only; the callee is implicit.
    FuncCall,

    /// Push true (operand 1) or false (operand 0).
    LoadBool,

    /// Push an interned string.
    LoadString,

    /// Push an interned number.
    LoadNumber,

    /// Push the value bound to a variable, or Nil when unbound.
    LoadSymbol,

    /// Push a function value.
    LoadFunc,

    /// Drop the current frame, restoring its parent.
    Return,

    /// Discard the top of the stack, unless the next instruction is
    /// `Return`: a function body's trailing value is its return value.
    Pop,
}

impl Op {
    /// Decode an opcode byte. Returns `None` for bytes outside the defined
    /// range.
    pub fn from_byte(byte: u8) -> Option<Op> {
        Some(match byte {
            0 => Op::Halt,
            1 => Op::Def,
            2 => Op::Defonce,
            3 => Op::Set,
            4 => Op::Defun,
            5 => Op::FuncCall,
            6 => Op::LoadBool,
            7 => Op::LoadString,
            8 => Op::LoadNumber,
            9 => Op::LoadSymbol,
            10 => Op::LoadFunc,
            11 => Op::Return,
            12 => Op::Pop,
            _ => return None,
        })
    }

    /// Mnemonic used by the disassembler.
    pub fn name(self) -> &'static str {
        match self {
            Op::Halt => "Halt",
            Op::Def => "Def",
            Op::Defonce => "Defonce",
            Op::Set => "Set",
            Op::Defun => "Defun",
            Op::FuncCall => "FuncCall",
            Op::LoadBool => "LoadBool",
            Op::LoadString => "LoadString",
            Op::LoadNumber => "LoadNumber",
            Op::LoadSymbol => "LoadSymbol",
            Op::LoadFunc => "LoadFunc",
            Op::Return => "Return",
            Op::Pop => "Pop",
        }
    }

    /// Returns true if the operand indexes the string intern table.
    #[inline]
    pub fn has_string_operand(self) -> bool {
        matches!(
            self,
            Op::Def | Op::Defonce | Op::Set | Op::LoadString | Op::LoadSymbol
        )
    }

    /// Returns true if the operand indexes the function table.
    #[inline]
    pub fn has_func_operand(self) -> bool {
        matches!(self, Op::Defun | Op::LoadFunc)
    }

    /// Returns true if the operand indexes the number intern table.
    #[inline]
    pub fn has_number_operand(self) -> bool {
        matches!(self, Op::LoadNumber)
    }
}
