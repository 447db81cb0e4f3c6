// slip-vm - Call frames for the Slip VM
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Activation frames and the parent-linked scope chain.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slip_compiler::ChunkId;

use crate::value::{Coroutine, Value};

/// Number of variable slots in a frame. Variable ids are interned-string
/// indices, so one byte of id space.
pub const VAR_SLOTS: usize = 256;

/// Shared handle to a frame.
///
/// A frame is reachable from the active chain while it executes and from
/// its coroutine while suspended, never from both for long; sharing is
/// single-threaded.
pub type FrameRef = Rc<RefCell<Frame>>;

/// An activation frame.
///
/// Frames link through `parent` to form the scope chain. A frame created
/// for a coroutine body carries a back-link to its coroutine; the back-link
/// is weak because the coroutine owns its suspended frame.
#[derive(Debug)]
pub struct Frame {
    /// Variable slots, indexed by interned-string index. Nil means the
    /// variable has not been defined in this frame.
    pub vars: Vec<Value>,

    /// Which code buffer this frame executes.
    pub chunk: ChunkId,

    /// Byte offset of the next instruction.
    pub ip: usize,

    /// Back-link to the coroutine this frame belongs to, if any.
    pub coroutine: Option<Weak<RefCell<Coroutine>>>,

    /// The frame to restore on return.
    pub parent: Option<FrameRef>,
}

impl Frame {
    /// Create a frame at the start of `chunk` with every slot unset.
    pub fn new(
        chunk: ChunkId,
        parent: Option<FrameRef>,
        coroutine: Option<Weak<RefCell<Coroutine>>>,
    ) -> FrameRef {
        Rc::new(RefCell::new(Frame {
            vars: vec![Value::Nil; VAR_SLOTS],
            chunk,
            ip: 0,
            coroutine,
            parent,
        }))
    }
}
