// slip - A tiny Lisp with a bytecode compiler, stack VM, and coroutines
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::process;

use slip_compiler::{compile, disasm};
use slip_vm::{register_builtins, ScopeMode, Vm};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --version flag
    if args.len() == 2 && (args[1] == "--version" || args[1] == "-v") {
        println!("Slip v0.1.0");
        return;
    }

    let mut scope_mode = ScopeMode::Outermost;
    let mut file = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--innermost" => scope_mode = ScopeMode::Innermost,
            _ => file = Some(arg.clone()),
        }
    }

    let Some(file) = file else {
        eprintln!("slip: error: no input files");
        process::exit(1);
    };

    if let Err(e) = run_file(&file, scope_mode) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Compile and execute a single source file, printing its disassembly
/// first.
fn run_file(path: &str, scope_mode: ScopeMode) -> Result<(), String> {
    let source =
        fs::read_to_string(path).map_err(|e| format!("Error reading '{}': {}", path, e))?;

    let script = compile(path, &source);
    print!("{}", disasm::disassemble(&script));

    let mut vm = Vm::with_scope_mode(scope_mode);
    register_builtins(&mut vm);
    vm.run(&script);
    Ok(())
}
