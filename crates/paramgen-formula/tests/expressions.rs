//! Guard expressions as the reducer sees them once placeholders are expanded.

use paramgen_formula::{FormulaError, Value, eval_formula, has_expandable_var, is_logical_expr};
use pretty_assertions::assert_eq;

fn holds(expr: &str) -> bool {
    match eval_formula(expr) {
        Ok(Value::Bool(value)) => value,
        other => panic!("`{expr}` did not evaluate to a bool: {other:?}"),
    }
}

#[test]
fn typical_grid_and_component_guards() {
    assert!(holds("'gx1v7' == 'gx1v7'"));
    assert!(holds("cesm == 'cesm'"));
    assert!(holds("128 > 64 and 'ocn' in ['ocn', 'ice']"));
    assert!(holds("'tx' not in ['gx1v7', 'gx3v7']"));
    assert!(!holds("not (4 >= 2)"));
}

#[test]
fn chained_comparison_checks_every_link() {
    assert!(holds("1 < 2 < 3"));
    assert!(!holds("1 < 3 < 2"));
}

#[test]
fn substring_membership() {
    assert!(holds("'gx1' in 'gx1v7'"));
    assert!(!holds("'tx' in 'gx1v7'"));
}

#[test]
fn guard_classification_before_and_after_expansion() {
    let raw = "$OCN_GRID == 'gx1v7'";
    assert!(is_logical_expr(raw));
    assert!(has_expandable_var(raw));

    let expanded = "'gx1v7' == 'gx1v7'";
    assert!(is_logical_expr(expanded));
    assert!(!has_expandable_var(expanded));
}

#[test]
fn arithmetic_is_not_a_guard_but_still_evaluates() {
    assert!(!is_logical_expr("1 + 1"));
    assert_eq!(eval_formula("1 + 1"), Ok(Value::Int(2)));
}

#[test]
fn syntax_errors_carry_the_expression() {
    let err = eval_formula("1 >").unwrap_err();
    match err {
        FormulaError::Syntax { expr, .. } => assert_eq!(expr, "1 >"),
        other => panic!("unexpected error: {other:?}"),
    }
}
