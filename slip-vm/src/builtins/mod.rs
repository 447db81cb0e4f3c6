// slip-vm - Built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Built-in functions, pre-registered as globals on a fresh VM.
//!
//! Builtins share the calling convention of user functions: the call site
//! pops the arguments, the builtin pushes exactly one result. Control-flow
//! builtins (`if`, `when`, `call`) run their callees through the VM's
//! subordinate execution.

mod arithmetic;
mod control;
mod coroutine;
mod io;

use std::rc::Rc;

use crate::value::{NativeFn, NativeFnPtr, Value};
use crate::vm::Vm;

/// Register the standard library on a VM.
pub fn register_builtins(vm: &mut Vm) {
    register(vm, "+", arithmetic::builtin_add);
    register(vm, "-", arithmetic::builtin_sub);
    register(vm, "*", arithmetic::builtin_mul);
    register(vm, "/", arithmetic::builtin_div);

    register(vm, "println", io::builtin_println);
    register(vm, "read", io::builtin_read);

    register(vm, "if", control::builtin_if);
    register(vm, "when", control::builtin_when);

    register(vm, "coroutine", coroutine::builtin_coroutine);
    register(vm, "call", coroutine::builtin_call);
    register(vm, "yield", coroutine::builtin_yield);
    register(vm, "done?", coroutine::builtin_done);
}

fn register(vm: &mut Vm, name: &str, func: NativeFnPtr) {
    vm.define_global(name, Value::Native(Rc::new(NativeFn::new(name, func))));
}
