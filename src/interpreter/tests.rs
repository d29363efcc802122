use super::*;
use crate::vm::{OverflowPolicy, WordStats};

/// Runs `input` in a fresh interpreter, returns (stdout, stderr, stack).
fn session(input: &str) -> (String, String, Vec<i64>) {
    let mut interpreter = Interpreter::new(VMOptions::default());
    let (out, err) = run_in(&mut interpreter, input);
    (out, err, interpreter.stack().to_vec())
}

fn run_in<T: Tracer>(interpreter: &mut Interpreter<T>, input: &str) -> (String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    interpreter.run(input.as_bytes(), &mut out, &mut err).unwrap();
    (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}

fn line_error(interpreter: &mut Interpreter, line: &str) -> LineError {
    match interpreter.execute_line(line, &mut Vec::<u8>::new()).unwrap() {
        Err(error) => error,
        Ok(()) => panic!("expected `{line}` to fail"),
    }
}

#[test]
fn test_literal_push() {
    for n in [0, 1, -1, 42, i64::MAX, i64::MIN] {
        let mut interpreter = Interpreter::new(VMOptions::default());
        interpreter.execute_line("7", &mut Vec::<u8>::new()).unwrap().unwrap();
        interpreter.execute_line(&n.to_string(), &mut Vec::<u8>::new()).unwrap().unwrap();
        assert_eq!(interpreter.stack(), [7, n]);
    }
}

#[test]
fn test_empty_lines_are_noops() {
    let (out, err, stack) = session("\n   \n\t\n");
    assert_eq!(out, "");
    assert_eq!(err, "");
    assert!(stack.is_empty());
}

#[test]
fn test_operators_ignore_case() {
    let (out, _, _) = session("1 2 swap print Print");
    assert_eq!(out, "1\n2\n");
}

#[test]
fn test_arithmetic_operand_order() {
    assert_eq!(session("10 3 - PRINT").0, "7\n");
    assert_eq!(session("10 3 / PRINT").0, "3\n");
    assert_eq!(session("10 3 % PRINT").0, "1\n");
    assert_eq!(session("-10 3 / PRINT").0, "-3\n");
    assert_eq!(session("6 7 * PRINT").0, "42\n");
}

#[test]
fn test_show_format() {
    let (out, _, stack) = session("10 20 30 SHOW");
    assert_eq!(out, "1: 30\n2: 20\n3: 10\n");
    assert_eq!(stack, [10, 20, 30]);
}

#[test]
fn test_show_is_idempotent() {
    let (out, _, _) = session("4 5 6\nSHOW\nSHOW");
    assert_eq!(out, "1: 6\n2: 5\n3: 4\n".repeat(2));
}

#[test]
fn test_show_empty_stack() {
    assert_eq!(session("SHOW").0, "");
}

#[test]
fn test_unknown_command_keeps_partial_line() {
    let mut interpreter = Interpreter::new(VMOptions::default());
    let error = line_error(&mut interpreter, "5 DUMP 6");
    assert_eq!(error.word, "DUMP");
    assert_eq!(error.index, 1);
    assert_eq!(error.error, WordError::Parse(ParserError::UnknownCommand("DUMP".to_string())));
    assert_eq!(interpreter.stack(), [5]);
}

#[test]
fn test_failure_positions() {
    let mut interpreter = Interpreter::new(VMOptions::default());
    assert_eq!(line_error(&mut interpreter, "DROP").index, 0);
    assert_eq!(line_error(&mut interpreter, "  1   2 0 / 3").index, 3);
    assert_eq!(interpreter.stack(), [1]);
}

#[test]
fn test_level_errors() {
    let mut interpreter = Interpreter::new(VMOptions::default());
    interpreter.execute_line("1 2 3", &mut Vec::<u8>::new()).unwrap().unwrap();

    let error = line_error(&mut interpreter, "0 PICK");
    assert_eq!(error.word, "PICK");
    assert_eq!(error.error, WordError::Operation(OperationError::InvalidLevel { level: 0 }));

    let error = line_error(&mut interpreter, "-1 ROLL");
    assert_eq!(error.error, WordError::Operation(OperationError::InvalidLevel { level: -1 }));

    assert_eq!(interpreter.stack(), [1, 2, 3]);
}

#[test]
fn test_diagnostic_line() {
    let (out, err, stack) = session("5 DUMP\nPRINT");
    assert_eq!(err, "error executing word DUMP at 1: unknown command DUMP\n");
    assert_eq!(out, "5\n");
    assert!(stack.is_empty());
}

#[test]
fn test_division_by_zero_then_continue() {
    let (out, err, _) = session("5 0 /\n1 2 + PRINT");
    assert_eq!(err, "error executing word / at 2: division by zero\n");
    assert_eq!(out, "3\n");
}

#[test]
fn test_output_before_failure_is_kept() {
    let (out, err, _) = session("1 2 PRINT PRINT PRINT 9");
    assert_eq!(out, "2\n1\n");
    assert!(err.starts_with("error executing word PRINT at 4: not enough stack levels"));
}

#[test]
fn test_run_result() {
    let mut interpreter = Interpreter::new(VMOptions::default());
    let mut out = Vec::<u8>::new();
    let mut err = Vec::<u8>::new();
    let result = interpreter.run("1 2\n\nx\n+ PRINT\n".as_bytes(), &mut out, &mut err).unwrap();
    assert_eq!(result, RunResult { lines_read: 4, lines_failed: 1, words_executed: 4 });
}

#[test]
fn test_state_persists_across_runs_until_reset() {
    let mut interpreter = Interpreter::new(VMOptions::default());
    run_in(&mut interpreter, "1 2");
    run_in(&mut interpreter, "3");
    assert_eq!(interpreter.stack(), [1, 2, 3]);
    interpreter.reset();
    assert!(interpreter.stack().is_empty());
}

#[test]
fn test_options_are_applied() {
    let mut interpreter = Interpreter::new(VMOptions::new(2, OverflowPolicy::Wrapping));
    let (out, err) = run_in(&mut interpreter, "9223372036854775807 1 + PRINT\n1 2 3");
    assert_eq!(out, "-9223372036854775808\n");
    assert_eq!(err, "error executing word 3 at 2: stack is full (2 levels)\n");
    assert_eq!(interpreter.stack(), [1, 2]);
}

#[test]
fn test_tracer_sees_every_word() {
    let mut interpreter = Interpreter::with_tracer(VMOptions::default(), WordStats::new(0));
    run_in(&mut interpreter, "1 2 3 DEPTH DUPN\nROT 0 /");
    let stats = interpreter.tracer();
    assert_eq!(stats.instructions, 4);
    assert_eq!(stats.failed_instructions, 1);
    assert_eq!(stats.max_depth, 7);
}

#[test]
fn test_input_errors_are_fatal() {
    struct Broken;
    impl io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "broken pipe"))
        }
    }

    let mut interpreter = Interpreter::new(VMOptions::default());
    let result = interpreter.run(io::BufReader::new(Broken), &mut Vec::<u8>::new(), &mut Vec::<u8>::new());
    assert!(matches!(result, Err(RunError::Io(_))));
}

#[test]
fn test_output_errors_are_separate_from_line_errors() {
    struct Closed;
    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let mut interpreter = Interpreter::new(VMOptions::default());
    // A failing word is a line outcome, not an I/O error.
    assert!(matches!(interpreter.execute_line("1 DUMP", &mut Closed), Ok(Err(_))));
    assert!(interpreter.execute_line("2", &mut Closed).unwrap().is_ok());
    assert!(interpreter.execute_line("PRINT", &mut Closed).is_err());

    let result = interpreter.run("3 PRINT".as_bytes(), &mut Closed, &mut Vec::<u8>::new());
    assert!(matches!(result, Err(RunError::Io(_))));
}

#[test]
fn test_repeated_whitespace_positions() {
    let mut interpreter = Interpreter::new(VMOptions::default());
    let error = line_error(&mut interpreter, "5  DUMP");
    assert_eq!(error.word, "DUMP");
    assert_eq!(error.index, 1);

    let error = line_error(&mut interpreter, "\t1 \t 2   +  x");
    assert_eq!(error.index, 3);
    assert_eq!(interpreter.stack(), [5, 3]);
}

#[test]
fn test_stats_count_operators_only() {
    let mut interpreter = Interpreter::with_tracer(VMOptions::default(), WordStats::new(0));
    let (_, err) = run_in(&mut interpreter, "5 DUMP\n6 +");
    assert_eq!(err.lines().count(), 1);
    let stats = interpreter.tracer();
    // Literals and unknown words never reach the stack engine as operators.
    assert_eq!(stats.instructions, 1);
    assert_eq!(stats.failed_instructions, 0);
    assert_eq!(stats.pushes, 3);
}
