// slip-vm - Shared test helpers
// Copyright (c) 2025 Tom Waddington. MIT licensed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use slip_compiler::compile;
use slip_vm::{register_builtins, ScopeMode, Vm};

/// Write half of a shared capture buffer.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compile and run `src`, returning everything `println` wrote.
pub fn run_capture(src: &str) -> String {
    run_capture_mode(src, ScopeMode::Outermost)
}

/// As `run_capture`, with an explicit scoping mode.
pub fn run_capture_mode(src: &str, mode: ScopeMode) -> String {
    let script = compile("<test>", src);
    let buf = SharedBuf::default();
    let mut vm = Vm::with_scope_mode(mode);
    vm.set_out(Box::new(buf.clone()));
    register_builtins(&mut vm);
    vm.run(&script);
    buf.contents()
}

/// Compile and run `src`, returning the VM for state inspection along with
/// the captured output.
pub fn run_vm(src: &str) -> (Vm, String) {
    let script = compile("<test>", src);
    let buf = SharedBuf::default();
    let mut vm = Vm::new();
    vm.set_out(Box::new(buf.clone()));
    register_builtins(&mut vm);
    vm.run(&script);
    let output = buf.contents();
    (vm, output)
}
