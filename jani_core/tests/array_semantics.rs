use jani_core::*;
use rand::Rng;
use std::collections::HashMap;

const RUNS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
enum Val {
    Bool(bool),
    Int(i64),
    Array(Vec<i64>),
}

// Minimal evaluator for the fragment produced by array-equality expansion.
fn eval(exp: &Expression, state: &HashMap<String, Val>) -> Val {
    match exp.kind() {
        ExprKind::Literal(Value::Bool(b)) => Val::Bool(*b),
        ExprKind::Literal(Value::Int(i)) => Val::Int(*i),
        ExprKind::Identifier(name) => state.get(name).cloned().expect("variable in state"),
        ExprKind::Operator { op, .. } => {
            let operand = |role| eval(exp.operand(role).expect("operand"), state);
            match op {
                Op::And => match (operand("left"), operand("right")) {
                    (Val::Bool(l), Val::Bool(r)) => Val::Bool(l && r),
                    _ => panic!("type mismatch"),
                },
                Op::Eq => Val::Bool(operand("left") == operand("right")),
                Op::ArrayAccess => match (operand("exp"), operand("index")) {
                    (Val::Array(arr), Val::Int(idx)) => Val::Int(arr[idx as usize]),
                    _ => panic!("type mismatch"),
                },
                _ => panic!("unexpected operator {op:?}"),
            }
        }
        other => panic!("unexpected expression {other:?}"),
    }
}

fn setup(values: &[i64]) -> (VariableRegistry, Expression) {
    let mut vars = VariableRegistry::new();
    vars.declare_array("a", BasicType::Int.into(), vec![5])
        .unwrap();
    let guard = Expression::equal(
        Expression::identifier("a"),
        Expression::array_value(values.iter().map(|v| Expression::literal(*v)).collect()),
    );
    let normalized = normalize_expression(&guard, &Scope::global(&vars)).unwrap();
    (vars, normalized)
}

fn state(backing: Vec<i64>, length: i64) -> HashMap<String, Val> {
    HashMap::from([
        ("a".to_owned(), Val::Array(backing)),
        ("a_length_1".to_owned(), Val::Int(length)),
    ])
}

#[test]
fn matches_active_elements() {
    let (_vars, normalized) = setup(&[4, 5, 6]);
    assert_eq!(
        eval(&normalized, &state(vec![4, 5, 6, 0, 0], 3)),
        Val::Bool(true)
    );
}

#[test]
fn differs_on_active_element() {
    let (_vars, normalized) = setup(&[4, 5, 6]);
    assert_eq!(
        eval(&normalized, &state(vec![4, 9, 6, 0, 0], 3)),
        Val::Bool(false)
    );
}

#[test]
fn differs_on_length() {
    let (_vars, normalized) = setup(&[4, 5, 6]);
    assert_eq!(
        eval(&normalized, &state(vec![4, 5, 6, 7, 0], 4)),
        Val::Bool(false)
    );
    assert_eq!(
        eval(&normalized, &state(vec![4, 5, 6, 7, 0], 2)),
        Val::Bool(false)
    );
}

#[test]
fn ignores_backing_store_beyond_length() {
    let (_vars, normalized) = setup(&[1, 2, 3]);
    let mut rng = rand::rng();
    for _ in 0..RUNS {
        let backing = vec![
            1,
            2,
            3,
            rng.random_range(-100..100),
            rng.random_range(-100..100),
        ];
        assert_eq!(eval(&normalized, &state(backing, 3)), Val::Bool(true));
    }
}

#[test]
fn agrees_with_list_equality() {
    let mut rng = rand::rng();
    for _ in 0..RUNS {
        let expected: Vec<i64> = (0..rng.random_range(0..=5))
            .map(|_| rng.random_range(0..3))
            .collect();
        let (_vars, normalized) = setup(&expected);
        let length = rng.random_range(0..=5);
        let backing: Vec<i64> = (0..5).map(|_| rng.random_range(0..3)).collect();
        let active = &backing[..length];
        assert_eq!(
            eval(&normalized, &state(backing.clone(), length as i64)),
            Val::Bool(active == expected.as_slice()),
            "a = {active:?} compared with {expected:?}"
        );
    }
}
