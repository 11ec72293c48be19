// tests/evaluator_tests.rs

use std::cell::RefCell;

use trap_rules::error::RuleError;
use trap_rules::evaluator::{eval_function, Evaluator};
use trap_rules::functions::{FunctionError, FunctionRegistry, FunctionService};
use trap_rules::lexer::Lexer;
use trap_rules::logging::{LogSink, Severity, TracingSink};
use trap_rules::value::Value;

use rust_decimal::Decimal;

/// Function service and log sink sharing one event list, so the order of
/// log lines and calls can be checked.
#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn calls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("call ").map(str::to_string))
            .collect()
    }
}

impl FunctionService for Recorder {
    fn evaluate(&self, call: &str) -> Result<Value, FunctionError> {
        self.events.borrow_mut().push(format!("call {}", call));
        if call.starts_with("_fail") {
            return Err(FunctionError::Failed("service down".to_string()));
        }
        if call.starts_with("_num") {
            let inner = &call[5..call.len() - 1];
            return inner
                .parse::<Decimal>()
                .map(Value::Number)
                .map_err(|_| FunctionError::Malformed(call.to_string()));
        }
        Ok(Value::Boolean(call.starts_with("_true")))
    }
}

impl LogSink for Recorder {
    fn log(&self, message: &str, severity: Severity) {
        self.events
            .borrow_mut()
            .push(format!("{} {}", severity, message));
    }
}

fn eval(rule: &str) -> Result<Value, RuleError> {
    let recorder = Recorder::default();
    Evaluator::new(&recorder, &recorder).evaluate(rule)
}

fn eval_bool(rule: &str) -> bool {
    match eval(rule) {
        Ok(Value::Boolean(b)) => b,
        other => panic!("expected boolean for {}, got {:?}", rule, other),
    }
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_comparisons() {
    let test_cases = vec![
        ("1=1", true),
        ("1==1", true),
        ("1=2", false),
        ("1!=2", true),
        ("2<10", true),
        ("10<=10", true),
        ("3>2.5", true),
        ("-1>=0", false),
        ("1.0=1", true),
        (".5<1", true),
        (r#""abc"="abc""#, true),
        (r#""abc"<"abd""#, true),
        (r#""b">"abc""#, true),
        (r#""abc"!="abd""#, true),
    ];

    for (rule, expected) in test_cases {
        assert_eq!(eval_bool(rule), expected, "Failed for rule: {}", rule);
    }
}

#[test]
fn test_regex_match() {
    assert!(eval_bool(r#""link down"~"^link""#));
    assert!(!eval_bool(r#""link up"~"down$""#));
    assert!(eval_bool(r#""eth0/12"~"[0-9]+/[0-9]+""#));
}

#[test]
fn test_spaces_between_elements() {
    assert!(eval_bool(r#" 1 = 1 & "a b" = "a b" "#));
}

// ============================================================================
// Logic
// ============================================================================

#[test]
fn test_logical_chains() {
    let test_cases = vec![
        ("1=1&2=2", true),
        ("1=1&2=3", false),
        ("1=2|2=2", true),
        ("1=2|2=3", false),
        ("(1=1)&(2=2)", true),
        ("(1=1)|(1=2)", true),
        ("(1=2)&(1=1)", false),
        ("1=2|2=3|3=3", true),
        ("1=1&2=2&3=4", false),
    ];

    for (rule, expected) in test_cases {
        assert_eq!(eval_bool(rule), expected, "Failed for rule: {}", rule);
    }
}

#[test]
fn test_first_operator_binds_its_elements() {
    // After a comparison the rest of the rule is the right side
    assert!(!eval_bool("1=2&1=1|1=1"));
    // Two evaluated elements are combined before the chain continues
    assert!(eval_bool("(1=2)&(1=1)|(1=1)"));
    assert!(!eval_bool("(1=1)|(1=1)&(1=2)"));
}

#[test]
fn test_negation() {
    assert!(eval_bool("!(1=2)"));
    assert!(!eval_bool("!(1=1)"));
    assert!(eval_bool("!1=2"));
    assert!(eval_bool("1=1&!(2=3)"));
    assert!(eval_bool("1=2|!(2=3)"));
    assert!(!eval_bool("(1=1)&!(2=2)"));
}

#[test]
fn test_nested_groups() {
    assert!(eval_bool("((1=1))"));
    assert!(eval_bool(r#"(1==1 & (2==2) & ("a)b"="a)b"))"#));
    assert!(!eval_bool("((1=1)&((2=3)|(4=5)))"));
}

#[test]
fn test_short_circuit_skips_function_calls() {
    let recorder = Recorder::default();
    let evaluator = Evaluator::new(&recorder, &recorder);

    assert_eq!(
        evaluator.evaluate("1=2&_fail(1)").unwrap(),
        Value::Boolean(false)
    );
    assert_eq!(
        evaluator.evaluate("1=1|_fail(1)").unwrap(),
        Value::Boolean(true)
    );
    assert!(recorder.calls().is_empty());
}

// ============================================================================
// Function calls
// ============================================================================

#[test]
fn test_function_results() {
    assert!(eval_bool("_true(1)"));
    assert!(!eval_bool("_false()"));
    assert!(eval_bool("!_false()"));
    assert!(eval_bool("_true(1)&_true(2)"));
    assert!(eval_bool("_num(2)>_num(1)"));
}

#[test]
fn test_function_span_forwarded_verbatim() {
    let recorder = Recorder::default();
    let evaluator = Evaluator::new(&recorder, &recorder);

    evaluator.evaluate(r#"1=1&_true("a,b", (1,2))"#).unwrap();
    assert_eq!(recorder.calls(), vec![r#"_true("a,b", (1,2))"#.to_string()]);
}

#[test]
fn test_no_function_span() {
    let recorder = Recorder::default();
    let mut lexer = Lexer::new("no_function(1,2)");

    eval_function(&mut lexer, &recorder, &recorder).unwrap();
    assert_eq!(recorder.calls(), vec!["no_function(1,2)".to_string()]);
    assert!(lexer.is_eof());
}

#[test]
fn test_function_service_error_propagates() {
    let recorder = Recorder::default();
    let evaluator = Evaluator::new(&recorder, &recorder);

    match evaluator.evaluate("1=1&_fail(1)") {
        Err(RuleError::FunctionService {
            call,
            rule,
            offset,
            source: FunctionError::Failed(message),
        }) => {
            assert_eq!(call, "_fail(1)");
            assert_eq!(rule, "1=1&_fail(1)");
            assert_eq!(offset, 4);
            assert_eq!(message, "service down");
        }
        other => panic!("expected FunctionService error, got {:?}", other),
    }

    assert_eq!(
        recorder.events(),
        vec![
            "DEBUG got function _fail(1)".to_string(),
            "call _fail(1)".to_string(),
        ]
    );
}

#[test]
fn test_builtin_functions() {
    let functions = FunctionRegistry::with_builtins();
    let evaluator = Evaluator::new(&functions, &TracingSink);

    let test_cases = vec![
        (r#"_contains("link down", "down")"#, true),
        (r#"_startswith("eth0/1", "eth")"#, true),
        (r#"_endswith("eth0/1", "/2")"#, false),
        (r#"_upper("a")=_upper("A")"#, true),
        (r#"_length("abc")=_length("xyz")"#, true),
        (r#"_innetwork("10.0.0.5", "10.0.0.0", 24)"#, true),
        (r#"_innetwork("10.0.1.5", "10.0.0.0", 24)"#, false),
    ];

    for (rule, expected) in test_cases {
        assert_eq!(
            evaluator.evaluate(rule).unwrap(),
            Value::Boolean(expected),
            "Failed for rule: {}",
            rule
        );
    }

    assert!(matches!(
        evaluator.evaluate("_nosuch(1)"),
        Err(RuleError::FunctionService {
            source: FunctionError::UnknownFunction(_),
            ..
        })
    ));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_lone_value_is_not_boolean() {
    assert!(matches!(eval("1"), Err(RuleError::NotBoolean { .. })));
    assert!(matches!(eval(r#""up""#), Err(RuleError::NotBoolean { .. })));
}

#[test]
fn test_type_errors() {
    assert!(matches!(
        eval(r#""a"=1"#),
        Err(RuleError::TypeMismatch { .. })
    ));
    assert!(matches!(
        eval("(1=1)=1"),
        Err(RuleError::TypeMismatch { .. })
    ));
    assert!(matches!(
        eval("1&2"),
        Err(RuleError::BooleanOperands { .. })
    ));
    assert!(matches!(
        eval("1=!2"),
        Err(RuleError::MixedBoolean { offset: 2, .. })
    ));
    assert!(matches!(
        eval("_num(1)<_true()"),
        Err(RuleError::TypeMismatch { .. })
    ));
}

#[test]
fn test_structural_errors() {
    assert!(matches!(eval("1="), Err(RuleError::UnexpectedEnd { offset: 2, .. })));
    assert!(matches!(
        eval("x=1"),
        Err(RuleError::UnexpectedCharacter { found: 'x', offset: 0, .. })
    ));
    assert!(matches!(
        eval("1#2"),
        Err(RuleError::UnknownOperator { found: '#', offset: 1, .. })
    ));
    assert!(matches!(
        eval("1=1x"),
        Err(RuleError::TrailingInput { found: 'x', offset: 3, .. })
    ));
    assert!(matches!(
        eval(r#"1="abc"#),
        Err(RuleError::UnterminatedString { .. })
    ));
    assert!(matches!(
        eval("1=1&(2=2"),
        Err(RuleError::UnterminatedGroup { .. })
    ));
}

#[test]
fn test_invalid_numbers_fail_on_compare() {
    match eval("1.2.3=1") {
        Err(RuleError::InvalidNumber { text, .. }) => assert_eq!(text, "1.2.3"),
        other => panic!("expected InvalidNumber, got {:?}", other),
    }
    assert!(matches!(eval("--5<1"), Err(RuleError::InvalidNumber { .. })));
}

#[test]
fn test_invalid_pattern() {
    assert!(matches!(
        eval(r#""a"~"(""#),
        Err(RuleError::InvalidPattern { .. })
    ));
}

#[test]
fn test_group_errors_use_group_offsets() {
    match eval("1=1&(2=x)") {
        Err(RuleError::UnexpectedCharacter { rule, offset, .. }) => {
            assert_eq!(rule, "2=x");
            assert_eq!(offset, 2);
        }
        other => panic!("expected UnexpectedCharacter, got {:?}", other),
    }
}

#[test]
fn test_error_offsets_exposed() {
    let err = eval("1=1x").unwrap_err();
    assert_eq!(err.offset(), Some(3));
    assert_eq!(eval("1").unwrap_err().offset(), None);
}

// ============================================================================
// Evaluation entry points
// ============================================================================

#[test]
fn test_evaluation_from_offset() {
    let recorder = Recorder::default();
    let evaluator = Evaluator::new(&recorder, &recorder);

    let (value, end) = evaluator.evaluation("##1=1", 2).unwrap();
    assert_eq!(value, Value::Boolean(true));
    assert_eq!(end, 5);
}

#[test]
fn test_idempotent_evaluation() {
    let recorder = Recorder::default();
    let evaluator = Evaluator::new(&recorder, &recorder);

    for rule in ["1=1&(2<3)", r#"("a)"="a)")|1=2"#, "1=2&_true(1)", "!(1=1)"] {
        let first = evaluator.evaluation(rule, 0).unwrap();
        let second = evaluator.evaluation(rule, 0).unwrap();
        assert_eq!(first, second, "Failed for rule: {}", rule);
    }
}

#[test]
fn test_concurrent_evaluations() {
    let functions = FunctionRegistry::with_builtins();
    let rules = [
        ("1=1&(2<3)", true),
        (r#""abc"~"^a""#, true),
        ("1=2|2=3", false),
        (r#"_contains("x", "y")"#, false),
    ];

    std::thread::scope(|scope| {
        for (rule, expected) in rules {
            let functions = &functions;
            scope.spawn(move || {
                let evaluator = Evaluator::new(functions, &TracingSink);
                for _ in 0..100 {
                    assert_eq!(evaluator.evaluate(rule).unwrap(), Value::Boolean(expected));
                }
            });
        }
    });
}
