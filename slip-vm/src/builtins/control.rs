// slip-vm - Conditional built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Conditionals: if, when
//!
//! Branches are thunks (typically built with the `#` reader macro); the
//! chosen branch runs to its first `Return` and whatever it pushed becomes
//! the conditional's result.

use std::any::Any;

use slip_compiler::Script;

use crate::value::Value;
use crate::vm::{Result, RuntimeError, Vm};

/// (if cond then-thunk else-thunk)
pub(crate) fn builtin_if(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    script: &Script,
    args: &[Value],
) -> Result<()> {
    if args.len() != 3 {
        return Err(RuntimeError::ArityError {
            name: "if".to_string(),
            expected: 3,
            got: args.len(),
        });
    }
    let branch = if args[0].is_truthy() {
        &args[1]
    } else {
        &args[2]
    };
    vm.call_subordinate(script, branch.clone(), &[]);
    Ok(())
}

/// (when cond then-thunk) - the missing else branch yields Nil
pub(crate) fn builtin_when(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    script: &Script,
    args: &[Value],
) -> Result<()> {
    if args.len() != 2 {
        return Err(RuntimeError::ArityError {
            name: "when".to_string(),
            expected: 2,
            got: args.len(),
        });
    }
    if args[0].is_truthy() {
        vm.call_subordinate(script, args[1].clone(), &[]);
    } else {
        vm.push(Value::Nil);
    }
    Ok(())
}
