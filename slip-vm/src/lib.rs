// slip-vm - Virtual machine and runtime for the Slip programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime for compiled Slip scripts: the tagged value model, the stack
//! machine with its parent-linked frame chain, the coroutine protocol, and
//! the built-in function library.
//!
//! ```
//! use slip_compiler::compile;
//! use slip_vm::{register_builtins, Vm};
//!
//! let script = compile("<demo>", "(def x 2) (println (* x 21))");
//! let mut vm = Vm::new();
//! register_builtins(&mut vm);
//! vm.run(&script);
//! ```

pub mod builtins;
pub mod value;
pub mod vm;

pub use builtins::register_builtins;
pub use value::{Coroutine, CoroutineRef, CustomType, NativeFn, NativeFnPtr, Value};
pub use vm::{RuntimeError, ScopeMode, Vm};
