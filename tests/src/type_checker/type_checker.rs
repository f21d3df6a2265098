//! Type checker test suite
//!
//! One module per construct. Node types are looked up on the arena stored in the
//! `TypedContext`, by node kind and source text.
use crate::utils::{codes, diagnostic_text, node, type_check, type_of};
use cairn_ast::nodes::NodeKind;
use cairn_type_checker::errors::{DiagnosticKind, TypeCheckError};

const ID: &str = "(def id (Fn I32 I32) (fn ((x I32)) I32 x))\n";

mod literals {
    use super::*;

    #[test]
    fn test_int_takes_the_goal_type() {
        let source = "(def x U8 255)";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "255"), "U8");
    }

    #[test]
    fn test_int_limits() {
        let fits = [
            ("I8", "127"),
            ("I16", "32767"),
            ("I32", "2147483647"),
            ("I64", "9223372036854775807"),
            ("U8", "255"),
            ("U16", "65535"),
            ("U32", "4294967295"),
            ("U64", "18446744073709551615"),
        ];
        for (ty, max) in fits {
            let source = format!("(def x {ty} {max})");
            assert!(type_check(&source).is_success(), "{source}");
        }
        let too_large = [
            ("I8", "128"),
            ("I16", "32768"),
            ("I32", "2147483648"),
            ("I64", "9223372036854775808"),
            ("U8", "256"),
            ("U16", "65536"),
            ("U32", "4294967296"),
            ("U64", "18446744073709551616"),
            ("U64", "99999999999999999999999999"),
        ];
        for (ty, value) in too_large {
            let source = format!("(def x {ty} {value})");
            let typed_context = type_check(&source);
            assert_eq!(codes(&typed_context), ["INT_LARGER_THAN_MAX"], "{source}");
            assert_eq!(type_of(&typed_context, &source, NodeKind::Int, value), "?");
        }
    }

    #[test]
    fn test_int_overflow_message() {
        let source = "(def small I8 300)";
        let typed_context = type_check(source);
        let errors = typed_context.errors(source);
        assert_eq!(
            errors[0].to_string(),
            "integer literal `300` is larger than the maximum of `I8`"
        );
    }

    #[test]
    fn test_int_against_non_integer() {
        let source = "(def flag Bool 1)";
        let typed_context = type_check(source);
        assert_eq!(
            typed_context.diagnostics()[0].kind,
            DiagnosticKind::LiteralMismatch {
                expected: cairn_type_checker::type_info::TypeIndex::BOOL
            }
        );
        assert_eq!(diagnostic_text(&typed_context, source, 0), "1");
    }

    #[test]
    fn test_string_is_a_list_of_bytes() {
        for ty in ["String", "[U8]"] {
            let source = format!("(def s {ty} \"hello\")");
            let typed_context = type_check(&source);
            assert!(typed_context.is_success(), "{source}");
            assert_eq!(
                type_of(&typed_context, &source, NodeKind::Str, "\"hello\""),
                "[U8]"
            );
        }
    }

    #[test]
    fn test_string_against_other_types() {
        let source = "(def s [U16] \"wide\")";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["LITERAL_MISMATCH"]);
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "literal `\"wide\"` cannot have type `[U16]`"
        );
    }

    #[test]
    fn test_unit_literal() {
        let source = "(def u () ())";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        let source = "(def u I32 ())";
        assert_eq!(codes(&type_check(source)), ["LITERAL_MISMATCH"]);
    }

    #[test]
    fn test_builtin_terms() {
        let source = "(def yes Bool true)\n(def no Bool false)";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::Name, "false"), "Bool");
    }
}

mod names {
    use super::*;

    #[test]
    fn test_undeclared_name() {
        let source = "(def x I32 missing)";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["BINDING_NOT_FOUND"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "missing");
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "use of undeclared name `missing`"
        );
    }

    #[test]
    fn test_name_against_wrong_goal() {
        let source = "(def x I32 true)";
        let typed_context = type_check(source);
        assert_eq!(
            typed_context.errors(source),
            vec![TypeCheckError::TypeMismatch {
                expected: "I32".to_string(),
                found: "Bool".to_string(),
                location: cairn_ast::nodes::Span::new(11, 15),
            }]
        );
    }

    #[test]
    fn test_unknown_type_name() {
        let source = "(def x Integer 1)";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["TYPE_NOT_FOUND"]);
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "unknown type `Integer`"
        );
    }

    #[test]
    fn test_type_names_are_not_terms() {
        let source = "(def x Bool Bool)";
        assert_eq!(codes(&type_check(source)), ["BINDING_NOT_FOUND"]);
    }

    #[test]
    fn test_terms_are_not_type_names() {
        let source = "(def flag Bool true)\n(def x flag true)";
        assert_eq!(codes(&type_check(source)), ["TYPE_NOT_FOUND"]);
    }
}

mod lists {
    use super::*;

    #[test]
    fn test_elements_take_the_element_type() {
        let source = "(def xs [I32] [1 2 3])";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "2"), "I32");
        assert_eq!(type_of(&typed_context, source, NodeKind::List, "[1 2 3]"), "[I32]");
    }

    #[test]
    fn test_empty_list_with_goal() {
        let source = "(def xs [Bool] [])";
        assert!(type_check(source).is_success());
    }

    #[test]
    fn test_nested_lists() {
        let source = "(def grid [[U8]] [[1 2] [] [3]])";
        assert!(type_check(source).is_success());
    }

    #[test]
    fn test_list_against_non_list() {
        let source = "(def xs I32 [1 2])";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["LITERAL_MISMATCH"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "[1 2]");
    }

    #[test]
    fn test_bad_element_is_reported_once() {
        let source = "(def xs [Bool] [true 1 false])";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["LITERAL_MISMATCH"]);
        assert_eq!(type_of(&typed_context, source, NodeKind::List, "[true 1 false]"), "[Bool]");
    }

    /// A list in callee position has no goal: the first element decides.
    #[test]
    fn test_list_without_goal_uses_its_first_element() {
        let source = format!("{ID}(def y I32 ([id id] 1))");
        let typed_context = type_check(&source);
        assert_eq!(codes(&typed_context), ["CALLED_NON_FUNCTION"]);
        assert_eq!(
            typed_context.errors(&source)[0].to_string(),
            "called value of type `[(Fn I32 I32)]` is not a function"
        );
    }

    #[test]
    fn test_empty_list_without_goal_is_ambiguous() {
        let source = "(def y I32 ([] 1))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["AMBIGUOUS_TYPE"]);
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "cannot determine the type of `[]`, add a type annotation"
        );
    }
}

mod tuples {
    use super::*;

    #[test]
    fn test_slots_take_their_goals() {
        let source = "(def p (U8, Bool, String) (1, true, \"s\"))";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "1"), "U8");
        assert_eq!(
            type_of(&typed_context, source, NodeKind::Tuple, "(1, true, \"s\")"),
            "(U8, Bool, [U8])"
        );
    }

    /// The tuple body of an `I32` function: one mismatch spanning the tuple, and
    /// the elements are left unchecked.
    #[test]
    fn test_tuple_against_non_tuple() {
        let source = "(def answer (Fn I32) (fn () I32 (2, 3)))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["TYPE_MISMATCH"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "(2, 3)");
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "type mismatch: expected `I32`, found `(?, ?)`"
        );
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "2"), "?");
    }

    #[test]
    fn test_tuple_arity_mismatch() {
        let source = "(def p (I32, Bool) (1, true, 2))";
        let typed_context = type_check(source);
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "type mismatch: expected `(I32, Bool)`, found `(?, ?, ?)`"
        );
        assert_eq!(typed_context.diagnostics().len(), 1);
    }

    #[test]
    fn test_tuple_without_goal_synthesizes_slots() {
        let source = format!("{ID}(def y I32 ((id, true) 1))");
        let typed_context = type_check(&source);
        assert_eq!(
            typed_context.errors(&source)[0].to_string(),
            "called value of type `((Fn I32 I32), Bool)` is not a function"
        );
    }

    #[test]
    fn test_literal_slots_without_goal_are_ambiguous() {
        let source = "(def y I32 ((1, 2) 3))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["AMBIGUOUS_TYPE", "AMBIGUOUS_TYPE"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "1");
        assert_eq!(diagnostic_text(&typed_context, source, 1), "2");
    }
}

mod conditionals {
    use super::*;

    #[test]
    fn test_branches_take_the_goal() {
        let source = "(def x I32 (if true 1 2))";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::If, "(if true 1 2)"), "I32");
    }

    #[test]
    fn test_condition_must_be_bool() {
        let source = "(def x I32 (if 0 1 2))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["LITERAL_MISMATCH"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "0");
    }

    #[test]
    fn test_branch_mismatch_with_goal() {
        let source = "(def x I32 (if true 1 false))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["TYPE_MISMATCH"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "false");
    }

    /// Without a goal the first branch decides the type of the second.
    #[test]
    fn test_if_without_goal() {
        let source = format!("{ID}(def no (Fn Bool) (fn () Bool true))\n(def y I32 ((if true id id) 1))");
        let typed_context = type_check(&source);
        assert!(typed_context.is_success());
        assert_eq!(
            type_of(&typed_context, &source, NodeKind::If, "(if true id id)"),
            "(Fn I32 I32)"
        );

        let source = format!("{ID}(def no (Fn Bool) (fn () Bool true))\n(def y I32 ((if true id no) 1))");
        let typed_context = type_check(&source);
        assert_eq!(
            typed_context.errors(&source)[0].to_string(),
            "type mismatch: expected `(Fn I32 I32)`, found `(Fn Bool)`"
        );
        assert_eq!(diagnostic_text(&typed_context, &source, 0), "no");
        assert_eq!(typed_context.diagnostics().len(), 1);
    }
}

mod ascriptions {
    use super::*;

    #[test]
    fn test_ascription_gives_the_operand_a_goal() {
        let source = "(def x I64 (as I64 42))";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "42"), "I64");
        assert_eq!(type_of(&typed_context, source, NodeKind::As, "(as I64 42)"), "I64");
    }

    #[test]
    fn test_ascription_against_a_different_goal() {
        let source = "(def x I32 (as I64 42))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["TYPE_MISMATCH"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "(as I64 42)");
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "42"), "I64");
    }

    #[test]
    fn test_ascription_resolves_a_literal_in_callee_position() {
        let source = "(def y I32 ((as (Fn U8 I32) f) 1))\n(def f (Fn U8 I32) (fn ((b U8)) I32 7))";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "1"), "U8");
    }
}

mod functions {
    use super::*;

    #[test]
    fn test_parameters_are_bound_in_the_body() {
        let source = "(def not (Fn Bool Bool) (fn ((b Bool)) Bool (if b false true)))";
        let typed_context = type_check(source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, source, NodeKind::Binder, "b"), "Bool");
        assert_eq!(type_of(&typed_context, source, NodeKind::Name, "b"), "Bool");
    }

    #[test]
    fn test_function_type_of_the_literal() {
        let source = "(def pick (Fn I32 Bool I32) (fn ((n I32) (f Bool)) I32 n))";
        let typed_context = type_check(source);
        let function = node(
            &typed_context,
            source,
            NodeKind::Fn,
            "(fn ((n I32) (f Bool)) I32 n)",
        );
        assert_eq!(typed_context.render_node_type(function), "(Fn I32 Bool I32)");
    }

    /// The signature is compared before the body, which is still checked.
    #[test]
    fn test_signature_mismatch() {
        let source = "(def f (Fn I32 I32) (fn ((x Bool)) I32 300))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["TYPE_MISMATCH"]);
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "type mismatch: expected `(Fn I32 I32)`, found `(Fn Bool I32)`"
        );
        assert_eq!(type_of(&typed_context, source, NodeKind::Int, "300"), "I32");
    }

    #[test]
    fn test_function_against_non_function() {
        let source = "(def f I32 (fn () I32 1))";
        let typed_context = type_check(source);
        assert_eq!(
            typed_context.errors(source)[0].to_string(),
            "type mismatch: expected `I32`, found `(Fn I32)`"
        );
    }

    #[test]
    fn test_body_is_checked_against_the_return_type() {
        let source = "(def f (Fn String) (fn () String 5))";
        assert_eq!(codes(&type_check(source)), ["LITERAL_MISMATCH"]);
    }

    #[test]
    fn test_higher_order_functions() {
        let source = "
(def apply (Fn (Fn I32 I32) I32 I32)
  (fn ((f (Fn I32 I32)) (x I32)) I32 (f x)))
(def twice (Fn I32 I32) (fn ((n I32)) I32 (apply id (apply id n))))
";
        let source = format!("{ID}{source}");
        assert!(type_check(&source).is_success());
    }
}

mod calls {
    use super::*;

    #[test]
    fn test_call_returns_the_return_type() {
        let source = format!("{ID}(def y I32 (id 5))");
        let typed_context = type_check(&source);
        assert!(typed_context.is_success());
        assert_eq!(type_of(&typed_context, &source, NodeKind::Call, "(id 5)"), "I32");
        assert_eq!(type_of(&typed_context, &source, NodeKind::Int, "5"), "I32");
    }

    /// One diagnostic at the call; the extra argument is never checked.
    #[test]
    fn test_wrong_arity() {
        let source = format!("{ID}(def y I32 (id 1 2))");
        let typed_context = type_check(&source);
        assert_eq!(
            typed_context
                .diagnostics()
                .iter()
                .map(|diagnostic| diagnostic.kind)
                .collect::<Vec<_>>(),
            vec![DiagnosticKind::WrongArity {
                expected: 1,
                got: 2
            }]
        );
        assert_eq!(diagnostic_text(&typed_context, &source, 0), "(id 1 2)");
        assert_eq!(type_of(&typed_context, &source, NodeKind::Int, "2"), "?");
        assert_eq!(
            typed_context.errors(&source)[0].to_string(),
            "function expects 1 argument(s), but 2 provided"
        );
    }

    #[test]
    fn test_arguments_are_checked_left_to_right() {
        let source = "(def f (Fn Bool U8 I32) g)\n(def g (Fn Bool U8 I32) f)\n(def y I32 (f 1 true))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["LITERAL_MISMATCH", "TYPE_MISMATCH"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "1");
        assert_eq!(diagnostic_text(&typed_context, source, 1), "true");
    }

    #[test]
    fn test_call_result_against_goal() {
        let source = format!("{ID}(def y Bool (id 1))");
        let typed_context = type_check(&source);
        assert_eq!(codes(&typed_context), ["TYPE_MISMATCH"]);
        assert_eq!(diagnostic_text(&typed_context, &source, 0), "(id 1)");
    }

    #[test]
    fn test_calling_a_non_function() {
        let source = "(def n I32 5)\n(def y I32 (n 1))";
        let typed_context = type_check(source);
        assert_eq!(codes(&typed_context), ["CALLED_NON_FUNCTION"]);
        assert_eq!(diagnostic_text(&typed_context, source, 0), "(n 1)");
    }

    #[test]
    fn test_call_without_arguments() {
        let source = "(def zero (Fn U8) (fn () U8 0))\n(def y U8 (zero))";
        assert!(type_check(source).is_success());
    }
}

mod top_level {
    use super::*;

    #[test]
    fn test_forward_references() {
        let source = "(def a I32 b)\n(def b I32 1)";
        assert!(type_check(source).is_success());
    }

    #[test]
    fn test_mutual_recursion() {
        let source = "
(def even? (Fn U8 Bool) (fn ((n U8)) Bool (if (zero? n) true (odd? n))))
(def odd? (Fn U8 Bool) (fn ((n U8)) Bool (if (zero? n) false (even? n))))
(def zero? (Fn U8 Bool) (fn ((n U8)) Bool false))
";
        assert!(type_check(source).is_success());
    }

    #[test]
    fn test_definitions_take_their_declared_types() {
        let source = "(def pair (I32, Bool) (1, true))";
        let typed_context = type_check(source);
        let arena = typed_context.arena();
        let root = arena.root();
        let def = arena.children(root)[0];
        assert_eq!(typed_context.render_node_type(root), "()");
        assert_eq!(typed_context.render_node_type(def), "(I32, Bool)");
        assert_eq!(typed_context.render_node_type(arena.child(def, 0)), "(I32, Bool)");
        assert_eq!(typed_context.render_node_type(arena.child(def, 1)), "(I32, Bool)");
    }

    #[test]
    fn test_empty_program() {
        let typed_context = type_check("");
        assert!(typed_context.is_success());
        let root = typed_context.arena().root();
        assert_eq!(typed_context.render_node_type(root), "()");
    }
}
