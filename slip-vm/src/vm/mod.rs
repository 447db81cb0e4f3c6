// slip-vm - Stack-based virtual machine for Slip bytecode
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Stack-based virtual machine executing compiled scripts.
//!
//! The machine dispatches two-byte instructions from the current frame's
//! code buffer. Frames link through their parent into a scope chain; calls
//! push a frame, `Return` restores the parent. Data errors (bad operand
//! types, calling a non-callable) print a one-line diagnostic and execution
//! carries on with whatever is left on the stack; only `Halt` ends a run.

pub mod frame;
pub mod stack;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::rc::{Rc, Weak};

use slip_compiler::{ChunkId, Op, Script};

use crate::value::{Coroutine, Value};

pub use frame::{Frame, FrameRef};
pub use stack::ValueStack;

/// Runtime error raised by builtins and the dispatch loop.
///
/// These never stop the machine: the dispatcher prints the diagnostic and
/// keeps going.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// Wrong operand type.
    TypeError {
        expected: &'static str,
        got: &'static str,
    },
    /// Wrong number of arguments to a builtin.
    ArityError {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Calling a value that is not a function.
    NotCallable(&'static str),
    /// Operand stack capacity exceeded.
    StackOverflow,
    /// I/O failure inside a builtin.
    Io(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::TypeError { expected, got } => {
                write!(f, "type error: expected {}, got {}", expected, got)
            }
            RuntimeError::ArityError {
                name,
                expected,
                got,
            } => write!(
                f,
                "wrong number of arguments to '{}': expected {}, got {}",
                name, expected, got
            ),
            RuntimeError::NotCallable(typ) => write!(f, "value is not callable: {}", typ),
            RuntimeError::StackOverflow => write!(f, "value stack overflow"),
            RuntimeError::Io(msg) => write!(f, "i/o error: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for VM operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Which binding wins when a variable is visible in more than one frame of
/// the scope chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeMode {
    /// Historical behavior: lookup returns the outermost binding, and `set`
    /// assigns through every frame that holds one (consuming one stack
    /// value per write).
    #[default]
    Outermost,
    /// Conventional lexical scoping: the innermost binding wins.
    Innermost,
}

/// The Slip virtual machine.
pub struct Vm {
    stack: ValueStack,
    current: Option<FrameRef>,
    globals: HashMap<String, Value>,
    scope_mode: ScopeMode,
    out: Box<dyn Write>,
}

impl Vm {
    /// Create a VM with the default (historical) scoping.
    pub fn new() -> Self {
        Self::with_scope_mode(ScopeMode::default())
    }

    /// Create a VM with an explicit scoping mode.
    pub fn with_scope_mode(scope_mode: ScopeMode) -> Self {
        Vm {
            stack: ValueStack::new(),
            current: None,
            globals: HashMap::new(),
            scope_mode,
            out: Box::new(io::stdout()),
        }
    }

    /// Redirect builtin output. Tests capture it here.
    pub fn set_out(&mut self, out: Box<dyn Write>) {
        self.out = out;
    }

    /// The active scoping mode.
    pub fn scope_mode(&self) -> ScopeMode {
        self.scope_mode
    }

    /// Define a global binding. Builtin registration goes through here.
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    /// Look up a global binding.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    /// Push onto the operand stack. Overflow is a diagnostic and the value
    /// is dropped.
    pub fn push(&mut self, value: Value) {
        if !self.stack.push(value) {
            self.diagnose(&RuntimeError::StackOverflow);
        }
    }

    /// Pop from the operand stack; Nil when empty.
    pub fn pop(&mut self) -> Value {
        self.stack.pop()
    }

    /// Current operand stack depth.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Top of the operand stack, if any.
    pub fn stack_top(&self) -> Option<&Value> {
        self.stack.peek()
    }

    /// Write text to the VM's output sink.
    pub fn write_out(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| RuntimeError::Io(e.to_string()))
    }

    /// Execute a script's top-level code.
    pub fn run(&mut self, script: &Script) {
        self.current = Some(Frame::new(ChunkId::Top, None, None));
        self.dispatch(script, None);
        self.current = None;
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// The dispatch loop. With `stop` set, execution ends as soon as that
    /// frame becomes current again: its callee's `Return`, or a yield that
    /// restores it. This is how thunks and coroutine bodies run to
    /// completion inside a native call.
    fn dispatch(&mut self, script: &Script, stop: Option<&FrameRef>) {
        loop {
            let frame = match &self.current {
                Some(frame) => {
                    if let Some(stop) = stop {
                        if Rc::ptr_eq(frame, stop) {
                            break;
                        }
                    }
                    Rc::clone(frame)
                }
                None => break,
            };

            let (op, arg) = {
                let mut f = frame.borrow_mut();
                let code = script.chunk(f.chunk);
                match (code.op_at(f.ip), code.arg_at(f.ip)) {
                    (Some(op), Some(arg)) => {
                        f.ip += 2;
                        (op, arg)
                    }
                    // ran off the end of a code buffer
                    _ => break,
                }
            };

            match op {
                Op::Halt => break,

                Op::Pop => {
                    let suppressed = {
                        let f = frame.borrow();
                        script.chunk(f.chunk).op_at(f.ip) == Some(Op::Return)
                    };
                    if !suppressed {
                        self.stack.pop();
                    }
                }

                Op::LoadBool => self.push(Value::Bool(arg != 0)),

                Op::LoadNumber => {
                    let value = script
                        .numbers
                        .get(arg as usize)
                        .copied()
                        .map(Value::Number)
                        .unwrap_or(Value::Nil);
                    self.push(value);
                }

                Op::LoadString => {
                    let value = script
                        .strings
                        .get(arg as usize)
                        .map(|s| Value::Str(Rc::clone(s)))
                        .unwrap_or(Value::Nil);
                    self.push(value);
                }

                Op::LoadFunc => self.push(Value::Func(arg)),

                Op::LoadSymbol => {
                    let value = self.lookup(script, &frame, arg);
                    self.push(value);
                }

                Op::Def => {
                    let v = self.stack.pop();
                    frame.borrow_mut().vars[arg as usize] = v;
                }

                Op::Defonce => {
                    let unset = matches!(frame.borrow().vars[arg as usize], Value::Nil);
                    if unset {
                        let v = self.stack.pop();
                        frame.borrow_mut().vars[arg as usize] = v;
                    }
                }

                Op::Set => self.assign(script, &frame, arg),

                Op::Defun => {
                    if let Some(func) = script.funcs.get(arg as usize) {
                        frame.borrow_mut().vars[func.name as usize] = Value::Func(arg);
                    }
                }

                Op::FuncCall => {
                    let args = self.stack.pop_n(arg as usize);
                    let callee = self.stack.pop();
                    self.call_value(script, callee, &args);
                }

                Op::Return => {
                    let parent = frame.borrow_mut().parent.take();
                    self.current = parent;
                }
            }
        }
    }

    /// Variable lookup: walk the frame chain, then globals by name, then
    /// Nil. In outermost mode every frame is visited and the outermost
    /// non-Nil slot wins.
    fn lookup(&self, script: &Script, frame: &FrameRef, var: u8) -> Value {
        let mut found = Value::Nil;
        let mut cursor = Some(Rc::clone(frame));
        while let Some(f) = cursor {
            let fb = f.borrow();
            let slot = &fb.vars[var as usize];
            if !matches!(slot, Value::Nil) {
                if self.scope_mode == ScopeMode::Innermost {
                    return slot.clone();
                }
                found = slot.clone();
            }
            cursor = fb.parent.clone();
        }
        if !matches!(found, Value::Nil) {
            return found;
        }
        match script.string(var) {
            Some(name) => self.globals.get(name).cloned().unwrap_or(Value::Nil),
            None => Value::Nil,
        }
    }

    /// `set`: pop and assign. Outermost mode writes through every frame
    /// holding the variable, one popped value per write; globals receive
    /// the value only when no frame held it.
    fn assign(&mut self, script: &Script, frame: &FrameRef, var: u8) {
        let mut wrote = false;
        let mut cursor = Some(Rc::clone(frame));
        while let Some(f) = cursor {
            let next = f.borrow().parent.clone();
            let holds = !matches!(f.borrow().vars[var as usize], Value::Nil);
            if holds {
                let v = self.stack.pop();
                f.borrow_mut().vars[var as usize] = v;
                wrote = true;
                if self.scope_mode == ScopeMode::Innermost {
                    return;
                }
            }
            cursor = next;
        }
        if !wrote {
            let v = self.stack.pop();
            if let Some(name) = script.string(var) {
                self.globals.insert(name.to_string(), v);
            }
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// The shared call path for `FuncCall` and for builtins that invoke
    /// values themselves. A user function's frame is entered but not run;
    /// the dispatch loop picks it up.
    pub fn call_value(&mut self, script: &Script, callee: Value, args: &[Value]) {
        match callee {
            Value::Native(native) => {
                if let Err(e) = native.call(self, script, args) {
                    self.diagnose(&e);
                }
            }
            Value::Func(idx) => {
                // arguments go back onto the stack in forward order; the
                // function's prologue pops them into parameter slots
                for arg in args {
                    self.push(arg.clone());
                }
                self.enter_frame(ChunkId::Func(idx), None);
            }
            other => self.diagnose(&RuntimeError::NotCallable(other.type_name())),
        }
    }

    /// Call a value and run it to completion. Used by builtins; the result
    /// is whatever the call left on the stack.
    pub fn call_subordinate(&mut self, script: &Script, callee: Value, args: &[Value]) {
        match callee {
            Value::Func(_) => {
                let resume_at = self.current.clone();
                self.call_value(script, callee, args);
                self.run_until(script, resume_at);
            }
            // natives complete synchronously
            _ => self.call_value(script, callee, args),
        }
    }

    /// Print a one-line diagnostic and keep going.
    pub fn diagnose(&self, error: &RuntimeError) {
        eprintln!("slip: runtime error: {}", error);
    }

    // ========================================================================
    // Frame plumbing (used by the coroutine builtins)
    // ========================================================================

    pub(crate) fn current_frame(&self) -> Option<FrameRef> {
        self.current.clone()
    }

    /// Push a fresh frame and make it current.
    pub(crate) fn enter_frame(
        &mut self,
        chunk: ChunkId,
        coroutine: Option<Weak<RefCell<Coroutine>>>,
    ) -> FrameRef {
        let frame = Frame::new(chunk, self.current.take(), coroutine);
        self.current = Some(Rc::clone(&frame));
        frame
    }

    /// Reattach a suspended frame beneath the current one and make it
    /// current.
    pub(crate) fn resume_frame(&mut self, frame: FrameRef) {
        frame.borrow_mut().parent = self.current.take();
        self.current = Some(frame);
    }

    /// Detach the current frame, restoring its parent. The frame keeps
    /// running state (ip, vars) for whoever still holds it.
    pub(crate) fn detach_current(&mut self) {
        if let Some(frame) = self.current.take() {
            self.current = frame.borrow_mut().parent.take();
        }
    }

    /// Run the dispatch loop until `stop` (if any) is current again.
    pub(crate) fn run_until(&mut self, script: &Script, stop: Option<FrameRef>) {
        match stop {
            Some(stop) => self.dispatch(script, Some(&stop)),
            None => self.dispatch(script, None),
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
