// slip-compiler - Bytecode disassembler for Slip
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Human-readable rendering of a compiled script.

use std::fmt::Write;

use crate::opcode::Op;
use crate::script::{CodeBuf, Script};

/// Render a script's function table followed by its top-level code.
pub fn disassemble(script: &Script) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; {}", script.filename);

    for (i, func) in script.funcs.iter().enumerate() {
        let name = script.string(func.name).unwrap_or("?");
        let params: Vec<&str> = func
            .params
            .iter()
            .map(|&p| script.string(p).unwrap_or("?"))
            .collect();
        let _ = writeln!(out, "\nfunc {} {} [{}]", i, name, params.join(" "));
        write_code(&mut out, script, &func.code);
    }

    let _ = writeln!(out, "\ntop-level");
    write_code(&mut out, script, &script.code);
    out
}

fn write_code(out: &mut String, script: &Script, code: &CodeBuf) {
    for (offset, op, arg) in code.iter() {
        let _ = write!(out, "{:04} {:<10}", offset, op.name());

        if op.has_string_operand() {
            let text = script.string(arg).unwrap_or("?");
            if op == Op::LoadString {
                let _ = writeln!(out, " {:>3} ; \"{}\"", arg, text);
            } else {
                let _ = writeln!(out, " {:>3} ; {}", arg, text);
            }
        } else if op.has_number_operand() {
            let value = script.numbers.get(arg as usize).copied().unwrap_or(0.0);
            let _ = writeln!(out, " {:>3} ; {}", arg, value);
        } else if op.has_func_operand() {
            let name = script
                .funcs
                .get(arg as usize)
                .and_then(|f| script.string(f.name))
                .unwrap_or("?");
            let _ = writeln!(out, " {:>3} ; {}", arg, name);
        } else if matches!(op, Op::FuncCall | Op::LoadBool) {
            let _ = writeln!(out, " {:>3}", arg);
        } else {
            let _ = writeln!(out);
        }
    }
}
