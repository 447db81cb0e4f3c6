// slip-vm - Coroutine built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Coroutines: coroutine, call, yield, done?
//!
//! A coroutine wraps one function. `call` drives it: the first call enters
//! the function's code from the top; `yield` hands a value back to the
//! caller and parks the current frame inside the coroutine; the next `call`
//! pushes the resume value and re-enters the parked frame. Yielding is
//! supported from the top-level body of the coroutine's function only.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use slip_compiler::{ChunkId, Op, Script};

use crate::value::{Coroutine, CoroutineRef, Value};
use crate::vm::frame::FrameRef;
use crate::vm::{Result, RuntimeError, Vm};

/// (coroutine f) - wrap a function in a fresh, not-yet-started coroutine
pub(crate) fn builtin_coroutine(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    _script: &Script,
    args: &[Value],
) -> Result<()> {
    if args.len() != 1 {
        return Err(RuntimeError::ArityError {
            name: "coroutine".to_string(),
            expected: 1,
            got: args.len(),
        });
    }
    match &args[0] {
        Value::Func(idx) => {
            let co = Rc::new(RefCell::new(Coroutine::new(*idx)));
            vm.push(Value::Coroutine(co));
            Ok(())
        }
        other => Err(RuntimeError::TypeError {
            expected: "function",
            got: other.type_name(),
        }),
    }
}

/// (call co & args) - start or resume a coroutine, pushing the value it
/// yields (or returns); an exhausted coroutine yields Nil
pub(crate) fn builtin_call(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    script: &Script,
    args: &[Value],
) -> Result<()> {
    let co: CoroutineRef = match args.first() {
        Some(Value::Coroutine(co)) => Rc::clone(co),
        Some(other) => {
            return Err(RuntimeError::TypeError {
                expected: "coroutine",
                got: other.type_name(),
            });
        }
        None => {
            return Err(RuntimeError::ArityError {
                name: "call".to_string(),
                expected: 1,
                got: 0,
            });
        }
    };
    let extra = &args[1..];

    let suspended = co.borrow().suspended.clone();
    match suspended {
        None => {
            // First entry: extra arguments feed the parameter prologue. A
            // parameterless function gets nothing, so the caller's pending
            // operands stay undisturbed.
            let func = co.borrow().func;
            let params = script
                .funcs
                .get(func as usize)
                .map(|f| f.arity())
                .unwrap_or(0);
            if extra.is_empty() {
                if params > 0 {
                    vm.push(Value::Nil);
                }
            } else {
                for arg in extra {
                    vm.push(arg.clone());
                }
            }
            let resume_at = vm.current_frame();
            vm.enter_frame(ChunkId::Func(func), Some(Rc::downgrade(&co)));
            vm.run_until(script, resume_at);
        }
        Some(frame) => {
            if finished(script, &frame) {
                vm.push(Value::Nil);
                return Ok(());
            }
            // the pushed value becomes the suspended yield expression's
            // result; the statement Pop after the yield consumes it
            vm.push(extra.first().cloned().unwrap_or(Value::Nil));
            let resume_at = vm.current_frame();
            vm.resume_frame(frame);
            vm.run_until(script, resume_at);
        }
    }
    Ok(())
}

/// (yield v?) - hand v to the caller and park the current frame. Outside a
/// coroutine frame this is silently ignored.
pub(crate) fn builtin_yield(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    _script: &Script,
    args: &[Value],
) -> Result<()> {
    let Some(frame) = vm.current_frame() else {
        return Ok(());
    };
    let backlink = frame.borrow().coroutine.clone();
    let Some(co) = backlink.and_then(|weak| weak.upgrade()) else {
        return Ok(());
    };
    vm.push(args.first().cloned().unwrap_or(Value::Nil));
    co.borrow_mut().suspended = Some(Rc::clone(&frame));
    vm.detach_current();
    Ok(())
}

/// (done? co) - true once the coroutine has nothing left to produce
pub(crate) fn builtin_done(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    script: &Script,
    args: &[Value],
) -> Result<()> {
    if args.len() != 1 {
        return Err(RuntimeError::ArityError {
            name: "done?".to_string(),
            expected: 1,
            got: args.len(),
        });
    }
    match &args[0] {
        Value::Coroutine(co) => {
            let done = co
                .borrow()
                .suspended
                .as_ref()
                .map(|frame| finished(script, frame))
                .unwrap_or(false);
            vm.push(Value::Bool(done));
            Ok(())
        }
        other => Err(RuntimeError::TypeError {
            expected: "coroutine",
            got: other.type_name(),
        }),
    }
}

/// A parked frame is finished when it already ran its `Return`, or when
/// nothing but a statement `Pop` stands between its code pointer and the
/// function's `Return` (a `Pop` directly before `Return` is inert, so a
/// coroutine parked at its final yield has nothing left to produce).
fn finished(script: &Script, frame: &FrameRef) -> bool {
    let f = frame.borrow();
    let code = script.chunk(f.chunk);
    if f.ip >= 2 && code.op_at(f.ip - 2) == Some(Op::Return) {
        return true;
    }
    let mut at = f.ip;
    while code.op_at(at) == Some(Op::Pop) {
        at += 2;
    }
    code.op_at(at) == Some(Op::Return)
}
