// slip-vm - VM semantics tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tests for variable definition and lookup, the two scoping modes,
//! truthiness, and stack discipline.

mod common;

use common::{run_capture, run_capture_mode, run_vm};
use slip_vm::ScopeMode;

// =============================================================================
// Definition and lookup
// =============================================================================

#[test]
fn test_unresolved_symbol_is_nil() {
    assert_eq!(run_capture("(println nothing-here)"), "nil\n");
}

#[test]
fn test_def_binds_in_the_current_frame() {
    assert_eq!(run_capture("(def x 3) (println x)"), "3.0000\n");
}

#[test]
fn test_defonce_only_binds_once() {
    assert_eq!(
        run_capture("(defonce k 1) (defonce k 2) (println k)"),
        "1.0000\n"
    );
}

#[test]
fn test_set_reaches_an_existing_binding() {
    assert_eq!(run_capture("(def x 1) (set x 2) (println x)"), "2.0000\n");
}

#[test]
fn test_set_of_unbound_name_writes_a_global() {
    let (vm, output) = run_vm("(set g 5) (println g)");
    assert_eq!(output, "5.0000\n");
    assert!(vm.global("g").is_some());
}

#[test]
fn test_def_does_not_touch_globals() {
    let (vm, output) = run_vm("(def x 3) (println x)");
    assert_eq!(output, "3.0000\n");
    assert!(vm.global("x").is_none());
}

#[test]
fn test_function_arguments_bind_in_call_order() {
    let src = "
(defun pair [a b] (println a b))
(pair 1 2)
";
    assert_eq!(run_capture(src), "1.0000 2.0000\n");
}

#[test]
fn test_function_sees_enclosing_frame() {
    let src = "
(def base 100)
(defun add-base [n] (+ base n))
(println (add-base 1))
";
    assert_eq!(run_capture(src), "101.0000\n");
}

// =============================================================================
// Scoping modes
// =============================================================================

#[test]
fn test_outermost_mode_resolves_shadowed_names_outward() {
    let src = "
(def x 1)
(defun f [x] (println x))
(f 99)
";
    // the parameter is shadowed by the top-level binding
    assert_eq!(
        run_capture_mode(src, ScopeMode::Outermost),
        "1.0000\n"
    );
}

#[test]
fn test_innermost_mode_resolves_shadowed_names_inward() {
    let src = "
(def x 1)
(defun f [x] (println x))
(f 99)
";
    assert_eq!(
        run_capture_mode(src, ScopeMode::Innermost),
        "99.0000\n"
    );
}

#[test]
fn test_outermost_set_writes_every_holding_frame() {
    let src = "
(def x 1)
(defun f [x] (set x 7))
(f 99)
(println x)
";
    // the single pushed 7 lands in the innermost frame; the outer write
    // consumes an empty-stack Nil, un-defining the top-level x
    assert_eq!(run_capture_mode(src, ScopeMode::Outermost), "nil\n");
}

#[test]
fn test_innermost_set_stops_at_the_first_binding() {
    let src = "
(def x 1)
(defun f [x] (set x 7))
(f 99)
(println x)
";
    assert_eq!(run_capture_mode(src, ScopeMode::Innermost), "1.0000\n");
}

// =============================================================================
// Truthiness
// =============================================================================

#[test]
fn test_zero_and_empty_string_are_truthy() {
    assert_eq!(run_capture("(println (if 0 #1 #2))"), "1.0000\n");
    assert_eq!(run_capture("(println (if \"\" #1 #2))"), "1.0000\n");
}

#[test]
fn test_nil_and_false_are_falsy() {
    assert_eq!(run_capture("(println (if false #1 #2))"), "2.0000\n");
    assert_eq!(run_capture("(println (if nothing-here #1 #2))"), "2.0000\n");
}

#[test]
fn test_when_without_else_yields_nil() {
    assert_eq!(run_capture("(println (when false #1))"), "nil\n");
}

#[test]
fn test_thunks_see_the_frame_they_run_in() {
    let src = "
(def n 5)
(println (when true #(+ n 1)))
";
    assert_eq!(run_capture(src), "6.0000\n");
}

// =============================================================================
// Stack discipline
// =============================================================================

#[test]
fn test_stack_is_empty_after_well_typed_top_level_forms() {
    let (vm, _) = run_vm("(def x 10) (println (+ x 1)) (println \"done\") 42");
    assert_eq!(vm.stack_len(), 0);
}

#[test]
fn test_stack_is_empty_after_coroutine_traffic() {
    let src = "
(defun gen [] (yield 1) (yield 2))
(def c (coroutine gen))
(call c)
(call c)
(call c)
";
    let (vm, _) = run_vm(src);
    assert_eq!(vm.stack_len(), 0);
}

#[test]
fn test_deep_call_nesting() {
    let src = "
(defun add1 [n] (+ n 1))
(println (add1 (add1 (add1 (add1 0)))))
";
    assert_eq!(run_capture(src), "4.0000\n");
}

// =============================================================================
// Runtime representation
// =============================================================================

#[test]
fn test_interned_string_buffers_are_shared() {
    use std::rc::Rc;

    use slip_compiler::compile;
    use slip_vm::{register_builtins, Value, Vm};

    let script = compile("<test>", "(set s \"shared\")");
    let mut vm = Vm::new();
    register_builtins(&mut vm);
    vm.run(&script);

    let Some(Value::Str(held)) = vm.global("s") else {
        panic!("global 's' is not a string");
    };
    let interned = script
        .strings
        .iter()
        .find(|s| s.as_ref() == "shared")
        .expect("literal not interned");
    // the global still references the script's buffer, not a copy
    assert!(Rc::ptr_eq(&held, interned));
}

#[test]
fn test_println_renders_function_and_native_values() {
    let src = "
(defun inc [y] (+ y 1))
(println inc)
(println println)
";
    assert_eq!(run_capture(src), "#<fn inc>\n#<native-fn println>\n");
}
