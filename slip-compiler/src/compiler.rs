// slip-compiler - Bytecode compiler for Slip
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! One-pass compiler: source text to a `Script`.
//!
//! The compiler walks tokens with a single token of lookahead and appends
//! instructions as it goes; there is no intermediate syntax tree. Each
//! top-level form compiles independently: an error aborts that form with a
//! one-line diagnostic and compilation carries on at the next token.
//!
//! Expressions compile in one of two contexts. In statement context the
//! emitted expression is followed by `Pop` (its value is discarded); in
//! expression context the value stays on the stack for the enclosing form.
//! Function bodies compile every statement with its trailing `Pop` and rely
//! on the VM suppressing a `Pop` directly before `Return`, which is how the
//! last body expression becomes the return value.

use std::fmt;

use crate::lexer::{Lexer, Token};
use crate::opcode::Op;
use crate::script::{CodeBuf, FuncDef, Script, MAX_PARAMS};

/// Error during compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A form found something other than the token it requires.
    Expected { wanted: &'static str, found: String },
    /// One of the intern tables is full.
    TooManyConstants,
    /// A function declared more than `MAX_PARAMS` parameters.
    TooManyParams,
    /// A call site with more arguments than the operand byte can encode.
    TooManyArgs,
    /// An empty call form `()`.
    EmptyCall,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Expected { wanted, found } => {
                write!(f, "expected {}, found {}", wanted, found)
            }
            CompileError::TooManyConstants => write!(f, "too many constants (limit 256)"),
            CompileError::TooManyParams => {
                write!(f, "too many parameters (limit {})", MAX_PARAMS)
            }
            CompileError::TooManyArgs => write!(f, "too many arguments (limit 256)"),
            CompileError::EmptyCall => write!(f, "cannot call an empty form"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// Compile a whole source file into a `Script`.
///
/// Never fails as a whole: a malformed form prints a diagnostic to stderr
/// and the compiler continues with the next form. The returned top-level
/// code always ends with `Halt`.
pub fn compile(filename: &str, source: &str) -> Script {
    let mut compiler = Compiler::new(filename, source);
    let mut code = CodeBuf::new();
    while compiler.token != Token::Eof {
        if let Err(e) = compiler.statement(&mut code) {
            eprintln!("{}:{}: error: {}", filename, compiler.line, e);
        }
    }
    code.emit(Op::Halt, 0);
    compiler.script.code = code;
    compiler.script
}

struct Compiler<'a> {
    lexer: Lexer<'a>,
    token: Token,
    line: usize,
    script: Script,
}

impl<'a> Compiler<'a> {
    fn new(filename: &str, source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let token = lexer.next_token();
        let line = lexer.line();
        Compiler {
            lexer,
            token,
            line,
            script: Script::new(filename),
        }
    }

    fn advance(&mut self) {
        self.line = self.lexer.line();
        self.token = self.lexer.next_token();
    }

    /// Compile one expression and discard its value.
    fn statement(&mut self, code: &mut CodeBuf) -> Result<()> {
        self.expression(code)?;
        code.emit(Op::Pop, 0);
        Ok(())
    }

    /// Compile one expression, leaving its value on the stack.
    fn expression(&mut self, code: &mut CodeBuf) -> Result<()> {
        match self.token.clone() {
            Token::Number(n) => {
                let idx = self.intern_number(n)?;
                code.emit(Op::LoadNumber, idx);
                self.advance();
            }
            Token::Str(s) => {
                let idx = self.intern_string(&s)?;
                code.emit(Op::LoadString, idx);
                self.advance();
            }
            Token::Symbol(s) => {
                self.symbol(code, &s)?;
                self.advance();
            }
            Token::Hash => {
                self.advance();
                self.thunk(code)?;
            }
            Token::LParen => {
                self.advance();
                self.form(code)?;
            }
            other => {
                // consume the stray token so compilation can move on
                self.advance();
                return Err(CompileError::Expected {
                    wanted: "an expression",
                    found: other.to_string(),
                });
            }
        }
        Ok(())
    }

    fn symbol(&mut self, code: &mut CodeBuf, name: &str) -> Result<()> {
        match name {
            "true" => code.emit(Op::LoadBool, 1),
            "false" => code.emit(Op::LoadBool, 0),
            _ => {
                let idx = self.intern_string(name)?;
                code.emit(Op::LoadSymbol, idx);
            }
        }
        Ok(())
    }

    /// `#expr`: compile the body into a fresh zero-argument function and
    /// load it as a value.
    fn thunk(&mut self, code: &mut CodeBuf) -> Result<()> {
        let name = self.intern_string("#")?;
        let mut func = FuncDef::new(name);
        self.expression(&mut func.code)?;
        func.code.emit(Op::Return, 0);
        let idx = self.add_func(func)?;
        code.emit(Op::LoadFunc, idx);
        Ok(())
    }

    /// A parenthesized form: a reserved head or a call. The opening paren
    /// has already been consumed.
    fn form(&mut self, code: &mut CodeBuf) -> Result<()> {
        if let Token::Symbol(head) = self.token.clone() {
            match head.as_str() {
                "def" => return self.assignment(code, Op::Def),
                "defonce" => return self.assignment(code, Op::Defonce),
                "set" => return self.assignment(code, Op::Set),
                "defun" => return self.defun(code),
                _ => {}
            }
        }
        self.call(code)
    }

    /// `(def name expr)`, `(defonce name expr)`, `(set name expr)`.
    fn assignment(&mut self, code: &mut CodeBuf, op: Op) -> Result<()> {
        self.advance(); // the reserved head
        let name = self.expect_symbol()?;
        let idx = self.intern_string(&name)?;
        self.expression(code)?;
        code.emit(op, idx);
        self.expect(Token::RParen, "')'")
    }

    /// `(defun name [params...] body...)`.
    fn defun(&mut self, code: &mut CodeBuf) -> Result<()> {
        self.advance(); // defun
        let name = self.expect_symbol()?;
        let name_idx = self.intern_string(&name)?;
        let mut func = FuncDef::new(name_idx);

        self.expect(Token::LBracket, "'['")?;
        while self.token != Token::RBracket {
            let param = self.expect_symbol()?;
            if func.params.len() >= MAX_PARAMS {
                return Err(CompileError::TooManyParams);
            }
            func.params.push(self.intern_string(&param)?);
        }
        self.advance(); // ]

        // Arguments arrive on the stack in forward order, so the prologue
        // binds the last parameter first.
        for &param in func.params.iter().rev() {
            func.code.emit(Op::Def, param);
        }

        while self.token != Token::RParen && self.token != Token::Eof {
            self.statement(&mut func.code)?;
        }
        func.code.emit(Op::Return, 0);
        self.expect(Token::RParen, "')'")?;

        let idx = self.add_func(func)?;
        code.emit(Op::Defun, idx);
        Ok(())
    }

    /// A plain call: head expression, then arguments, then `FuncCall`. The
    /// operand counts arguments only.
    fn call(&mut self, code: &mut CodeBuf) -> Result<()> {
        let mut count: usize = 0;
        while self.token != Token::RParen {
            if self.token == Token::Eof {
                return Err(CompileError::Expected {
                    wanted: "')'",
                    found: Token::Eof.to_string(),
                });
            }
            self.expression(code)?;
            count += 1;
        }
        self.advance(); // )

        match count {
            0 => Err(CompileError::EmptyCall),
            n if n > 256 => Err(CompileError::TooManyArgs),
            n => {
                code.emit(Op::FuncCall, (n - 1) as u8);
                Ok(())
            }
        }
    }

    // ========================================================================
    // Token and intern helpers
    // ========================================================================

    fn expect_symbol(&mut self) -> Result<String> {
        match self.token.clone() {
            Token::Symbol(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(CompileError::Expected {
                wanted: "a symbol",
                found: other.to_string(),
            }),
        }
    }

    fn expect(&mut self, token: Token, wanted: &'static str) -> Result<()> {
        if self.token == token {
            self.advance();
            Ok(())
        } else {
            Err(CompileError::Expected {
                wanted,
                found: self.token.to_string(),
            })
        }
    }

    fn intern_string(&mut self, text: &str) -> Result<u8> {
        self.script
            .add_string(text)
            .ok_or(CompileError::TooManyConstants)
    }

    fn intern_number(&mut self, value: f64) -> Result<u8> {
        self.script
            .add_number(value)
            .ok_or(CompileError::TooManyConstants)
    }

    fn add_func(&mut self, func: FuncDef) -> Result<u8> {
        self.script
            .add_func(func)
            .ok_or(CompileError::TooManyConstants)
    }
}
