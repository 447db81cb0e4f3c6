// slip-compiler - Lexer, bytecode compiler, and disassembler for Slip
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Front end for the Slip language: the lexer, the one-pass bytecode
//! compiler, and the `Script` artifact it produces.
//!
//! Source text flows through [`lexer::Lexer`] into [`compiler::compile`],
//! which interns literals on the script and appends two-byte instructions
//! to its code buffers. The VM in `slip-vm` executes the result.

pub mod compiler;
pub mod disasm;
pub mod lexer;
pub mod opcode;
pub mod script;

pub use compiler::{compile, CompileError};
pub use opcode::Op;
pub use script::{ChunkId, CodeBuf, FuncDef, Script, MAX_INTERNED, MAX_PARAMS};
