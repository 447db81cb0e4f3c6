// slip-vm - Coroutine protocol tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for the coroutine suspend/resume protocol:
//! - first call vs resume
//! - welcome arguments and resume values
//! - exhaustion and `done?`
//! - yield outside a coroutine

mod common;

use common::run_capture;

#[test]
fn test_producer_yields_in_order() {
    let src = "
(defun gen [] (yield 10) (yield 20))
(def c (coroutine gen))
(println (call c))
(println (call c))
";
    assert_eq!(run_capture(src), "10.0000\n20.0000\n");
}

#[test]
fn test_first_call_arguments_bind_parameters() {
    let src = "
(defun gen [x] (yield x) (yield (+ x 1)))
(def c (coroutine gen))
(println (call c 10))
(println (call c))
(println (done? c))
";
    assert_eq!(run_capture(src), "10.0000\n11.0000\ntrue\n");
}

#[test]
fn test_resume_value_reaches_the_yield_expression() {
    let src = "
(defun gen [] (def got (yield 1)) (println got))
(def c (coroutine gen))
(println (call c))
(call c 42)
";
    assert_eq!(run_capture(src), "1.0000\n42.0000\n");
}

#[test]
fn test_missing_first_call_argument_binds_nil() {
    let src = "
(defun gen [x] (yield x))
(def c (coroutine gen))
(println (call c))
";
    assert_eq!(run_capture(src), "nil\n");
}

#[test]
fn test_exhausted_coroutine_yields_nil() {
    let src = "
(defun gen [] (yield 1) 5)
(def c (coroutine gen))
(println (call c))
(println (call c))
(println (call c))
(println (done? c))
";
    // the second call resumes past the yield and returns 5; the third finds
    // the coroutine exhausted
    assert_eq!(run_capture(src), "1.0000\n5.0000\nnil\ntrue\n");
}

#[test]
fn test_done_is_false_before_first_yield() {
    let src = "
(defun gen [] (yield 1))
(def c (coroutine gen))
(println (done? c))
(call c)
(println (done? c))
";
    assert_eq!(run_capture(src), "false\ntrue\n");
}

#[test]
fn test_done_is_false_mid_stream() {
    let src = "
(defun gen [] (yield 1) (yield 2))
(def c (coroutine gen))
(call c)
(println (done? c))
";
    assert_eq!(run_capture(src), "false\n");
}

#[test]
fn test_coroutine_that_never_yields_restarts() {
    let src = "
(defun gen [] (println \"ran\") 7)
(def c (coroutine gen))
(println (call c))
(println (done? c))
(println (call c))
";
    // without a yield the coroutine never suspends; each call runs the
    // whole body again
    assert_eq!(run_capture(src), "ran\n7.0000\nfalse\nran\n7.0000\n");
}

#[test]
fn test_yield_outside_coroutine_is_ignored() {
    assert_eq!(run_capture("(yield 5) (println 1)"), "1.0000\n");
}

#[test]
fn test_two_coroutines_interleave() {
    let src = "
(defun gen [x] (yield x) (yield (* x 10)))
(def a (coroutine gen))
(def b (coroutine gen))
(println (call a 1))
(println (call b 2))
(println (call a))
(println (call b))
";
    assert_eq!(run_capture(src), "1.0000\n2.0000\n10.0000\n20.0000\n");
}

#[test]
fn test_coroutine_keeps_locals_across_yields() {
    let src = "
(defun gen [x] (def y (* x 2)) (yield y) (yield (+ y 1)))
(def c (coroutine gen))
(call c 5)
(println (call c))
";
    assert_eq!(run_capture(src), "11.0000\n");
}

#[test]
fn test_coroutine_of_non_function_is_rejected() {
    // the diagnostic pushes nothing and execution carries on
    assert_eq!(run_capture("(coroutine 5) (println 1)"), "1.0000\n");
}
