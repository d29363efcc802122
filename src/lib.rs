//! # thirth
//! A line-oriented interpreter for a tiny postfix language with one integer stack.
//!
//! Every input line is a program of whitespace-separated words. A word is either
//! a base-10 integer, which is pushed, or one of the operators listed in
//! [`ops::Op`], matched case-insensitively:
//!
//! ```text
//! + - * / %                     pop a1, pop a2, push a2 op a1
//! DROP, n DROPN                 discard one or n levels
//! PRINT                         pop a value and print it
//! SWAP, ROT, n ROLL, n ROLLD    reorder levels
//! n PICK, DUP, n DUPN           copy levels
//! DEPTH                         push the number of levels
//! SHOW                          print every level, top first
//! ```
//!
//! Level 1 is the top of the stack. The stack lives for the whole session: a
//! failing word ends only its own line, and whatever the line did before the
//! failure stays on the stack.
//!
//! ```
//! use thirth::interpreter::Interpreter;
//! use thirth::vm::VMOptions;
//!
//! let mut interpreter = Interpreter::new(VMOptions::default());
//! let mut out = Vec::new();
//! let mut err = Vec::<u8>::new();
//! interpreter.run("1 2 3 ROT\nPRINT PRINT PRINT".as_bytes(), &mut out, &mut err).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "1\n3\n2\n");
//! ```
pub mod config;
pub mod interpreter;
pub mod ops;
pub mod parser;
pub mod vm;
