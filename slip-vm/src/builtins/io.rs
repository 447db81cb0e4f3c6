// slip-vm - I/O built-in functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! I/O operations: println, read

use std::any::Any;
use std::fmt::Write as _;
use std::fs;
use std::rc::Rc;

use slip_compiler::Script;

use crate::value::Value;
use crate::vm::{Result, RuntimeError, Vm};

/// (println & args) - print args space-separated with a newline
pub(crate) fn builtin_println(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    script: &Script,
    args: &[Value],
) -> Result<()> {
    let mut text = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        write_value(&mut text, script, arg);
    }
    text.push('\n');
    vm.write_out(&text)?;
    vm.push(Value::Nil);
    Ok(())
}

/// (read path) - push the named file's contents as a fresh string
pub(crate) fn builtin_read(
    _data: Option<&dyn Any>,
    vm: &mut Vm,
    _script: &Script,
    args: &[Value],
) -> Result<()> {
    if args.len() != 1 {
        vm.push(Value::Nil);
        return Err(RuntimeError::ArityError {
            name: "read".to_string(),
            expected: 1,
            got: args.len(),
        });
    }
    let Value::Str(path) = &args[0] else {
        vm.push(Value::Nil);
        return Err(RuntimeError::TypeError {
            expected: "string",
            got: args[0].type_name(),
        });
    };
    match fs::read_to_string(path.as_ref()) {
        Ok(contents) => {
            vm.push(Value::Str(Rc::from(contents.as_str())));
            Ok(())
        }
        Err(e) => {
            vm.push(Value::Nil);
            Err(RuntimeError::Io(format!("{}: {}", path, e)))
        }
    }
}

/// Write one value the way `println` renders it. Function values resolve
/// their name through the script's tables.
fn write_value(out: &mut String, script: &Script, value: &Value) {
    match value {
        Value::Func(i) => {
            let name = script
                .funcs
                .get(*i as usize)
                .and_then(|f| script.string(f.name))
                .unwrap_or("?");
            let _ = write!(out, "#<fn {}>", name);
        }
        other => {
            let _ = write!(out, "{}", other);
        }
    }
}
