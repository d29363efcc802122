//! The stack engine: the integer stack and the primitive operations on it.
use thiserror::Error;

use crate::ops::Op;


/// An implementation of [`Tracer`] that does not track anything.
///
/// This is the best choice if you do not need to observe the stack while
/// words are executed.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoStats {}

impl Tracer for NoStats {
    #[inline(always)]
    fn push(&mut self, _: i64) {}
    #[inline(always)]
    fn pop(&mut self) {}
    #[inline(always)]
    fn instruction(&mut self, _op: Op, _: &Result<Effect, OperationError>) {}
}

/// A trait for observing the stack engine.
/// Every value pushed or popped goes through [`Tracer::push`] and
/// [`Tracer::pop`], and every executed operator is reported with its result.
pub trait Tracer {
    fn push(&mut self, value: i64);
    fn pop(&mut self);
    fn instruction(&mut self, op: Op, result: &Result<Effect, OperationError>);
}

/// Counters collected over a session.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct WordStats {
    pub pushes: u64,
    pub pops: u64,
    pub instructions: u64,
    pub failed_instructions: u64,
    pub depth: usize,
    pub max_depth: usize,
}

impl WordStats {
    /// Creates counters for a stack that already holds `depth` values.
    pub fn new(depth: usize) -> Self {
        WordStats { depth, max_depth: depth, ..Default::default() }
    }
}

impl Tracer for WordStats {
    fn push(&mut self, _value: i64) {
        self.pushes += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop(&mut self) {
        self.pops += 1;
        self.depth = self.depth.saturating_sub(1);
    }

    fn instruction(&mut self, _op: Op, result: &Result<Effect, OperationError>) {
        self.instructions += 1;
        if result.is_err() {
            self.failed_instructions += 1;
        }
    }
}

/// An error that can occur while an operator runs.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationError {
    #[error("not enough stack levels: depth {depth}, {required} required")]
    InsufficientStack { depth: usize, required: i64 },
    #[error("{level} is not a stack level")]
    InvalidLevel { level: i64 },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("stack is full ({max_stack_size} levels)")]
    StackOverflow { max_stack_size: usize },
}

/// What the caller has to do after an operator ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Emit the popped value.
    Print(i64),
    /// Emit every level of the stack, see [`State::levels`].
    Show,
}

/// How arithmetic treats results that do not fit into an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Fail with [`OperationError::IntegerOverflow`].
    #[default]
    Checked,
    /// Two's complement wraparound.
    Wrapping,
}

/// Options for the stack engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VMOptions {
    /// The maximum number of levels the stack may hold.
    pub max_stack_size: usize,
    pub overflow: OverflowPolicy,
}

impl VMOptions {
    pub fn new(max_stack_size: usize, overflow: OverflowPolicy) -> Self {
        Self { max_stack_size, overflow }
    }
}

impl Default for VMOptions {
    fn default() -> Self {
        Self { max_stack_size: usize::MAX, overflow: OverflowPolicy::Checked }
    }
}

type CheckedOp = fn(i64, i64) -> Option<i64>;
type WrappingOp = fn(i64, i64) -> i64;

/// The stack and everything needed to run operators against it.
///
/// The last element of the underlying vector is level 1.
#[derive(Clone, Debug)]
pub struct State<T: Tracer = NoStats> {
    stack: Vec<i64>,
    options: VMOptions,
    tracer: T,
}

impl State<NoStats> {
    pub fn with_options(options: VMOptions) -> Self {
        State::new(Vec::new(), options, NoStats::default())
    }
}

impl Default for State<NoStats> {
    fn default() -> Self {
        State::with_options(VMOptions::default())
    }
}

impl<T: Tracer> State<T> {
    pub fn new(stack: Vec<i64>, options: VMOptions, tracer: T) -> Self {
        State { stack, options, tracer }
    }

    /// The stack, bottom first.
    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    pub fn into_stack(self) -> Vec<i64> {
        self.stack
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn options(&self) -> &VMOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Yields `(level, value)` pairs from the top of the stack down.
    pub fn levels(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.stack.iter().rev().copied().enumerate().map(|(i, value)| (i + 1, value))
    }

    pub fn push(&mut self, value: i64) -> Result<(), OperationError> {
        if self.stack.len() >= self.options.max_stack_size {
            return Err(OperationError::StackOverflow { max_stack_size: self.options.max_stack_size });
        }

        self.stack.push(value);
        self.tracer.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<i64, OperationError> {
        let value = self
            .stack
            .pop()
            .ok_or(OperationError::InsufficientStack { depth: 0, required: 1 })?;
        self.tracer.pop();
        Ok(value)
    }

    /// Runs one operator and reports it to the tracer.
    ///
    /// Values consumed before a failure stay consumed.
    pub fn run_op(&mut self, op: Op) -> Result<Effect, OperationError> {
        let result = self.apply(op);
        self.tracer.instruction(op, &result);
        result
    }

    fn check_level(&self, level: i64) -> Result<usize, OperationError> {
        if level <= 0 {
            return Err(OperationError::InvalidLevel { level });
        }
        if level > self.len() as i64 {
            return Err(OperationError::InsufficientStack { depth: self.len(), required: level });
        }
        Ok(level as usize)
    }

    /// Pops the operands of an operator that needs `required` levels.
    ///
    /// Operands popped before a shortfall is noticed stay popped.
    fn pop_operands(&mut self, required: i64) -> Result<(i64, i64), OperationError> {
        let depth = self.len();
        let not_enough = |_| OperationError::InsufficientStack { depth, required };
        let a1 = self.pop().map_err(not_enough)?;
        let a2 = self.pop().map_err(not_enough)?;
        Ok((a1, a2))
    }

    fn pop_level(&mut self) -> Result<usize, OperationError> {
        let level = self.pop()?;
        self.check_level(level)
    }

    fn binary(&mut self, checked: CheckedOp, wrapping: WrappingOp, divides: bool) -> Result<(), OperationError> {
        let (a1, a2) = self.pop_operands(2)?;
        if divides && a1 == 0 {
            return Err(OperationError::DivisionByZero);
        }
        let result = match self.options.overflow {
            OverflowPolicy::Checked => checked(a2, a1).ok_or(OperationError::IntegerOverflow)?,
            OverflowPolicy::Wrapping => wrapping(a2, a1),
        };
        self.push(result)
    }

    /// Moves level `n` to the top.
    fn roll(&mut self, n: usize) {
        let len = self.stack.len();
        self.stack[len - n..].rotate_left(1);
    }

    /// Moves the top down to level `n`.
    fn roll_down(&mut self, n: usize) {
        let len = self.stack.len();
        self.stack[len - n..].rotate_right(1);
    }

    fn dup_n(&mut self, n: usize) -> Result<(), OperationError> {
        let len = self.stack.len();
        if self.options.max_stack_size.saturating_sub(len) < n {
            return Err(OperationError::StackOverflow { max_stack_size: self.options.max_stack_size });
        }
        for i in len - n..len {
            let value = self.stack[i];
            self.push(value)?;
        }
        Ok(())
    }

    fn apply(&mut self, op: Op) -> Result<Effect, OperationError> {
        match op {
            Op::Add => self.binary(i64::checked_add, i64::wrapping_add, false)?,
            Op::Subtract => self.binary(i64::checked_sub, i64::wrapping_sub, false)?,
            Op::Multiply => self.binary(i64::checked_mul, i64::wrapping_mul, false)?,
            Op::Divide => self.binary(i64::checked_div, i64::wrapping_div, true)?,
            Op::Remainder => self.binary(i64::checked_rem, i64::wrapping_rem, true)?,
            Op::Drop => {
                self.pop()?;
            }
            Op::DropN => {
                let n = self.pop_level()?;
                for _ in 0..n {
                    self.pop()?;
                }
            }
            Op::Print => {
                return Ok(Effect::Print(self.pop()?));
            }
            Op::Swap => {
                let (a1, a2) = self.pop_operands(2)?;
                self.push(a1)?;
                self.push(a2)?;
            }
            Op::Rot => {
                let n = self.check_level(3)?;
                self.roll(n);
            }
            Op::Roll => {
                let n = self.pop_level()?;
                self.roll(n);
            }
            Op::RollD => {
                let n = self.pop_level()?;
                self.roll_down(n);
            }
            Op::Pick => {
                let n = self.pop_level()?;
                let value = self.stack[self.stack.len() - n];
                self.push(value)?;
            }
            Op::Depth => {
                let depth = self.stack.len() as i64;
                self.push(depth)?;
            }
            Op::Dup => {
                let n = self.check_level(1)?;
                self.dup_n(n)?;
            }
            Op::DupN => {
                let n = self.pop_level()?;
                self.dup_n(n)?;
            }
            Op::Show => return Ok(Effect::Show),
        }

        Ok(Effect::None)
    }
}
