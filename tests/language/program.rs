//! Integration tests for the program IR wire format

use choicelog_foundation::ErrorKind;
use choicelog_language::{Conclusion, Instruction, Pattern, Premise, Program, Rule, SplitPart};
use serde_json::json;

fn sample() -> Program {
    Program {
        seeds: vec!["$start".into()],
        rules: vec![
            Rule::Run {
                intermediate: "$start".into(),
                vars: vec![],
                instructions: vec![
                    Instruction::Const {
                        value: Pattern::string("k=v"),
                    },
                    Instruction::Split {
                        parts: vec![
                            SplitPart::Slot { slot: 0 },
                            SplitPart::Literal { text: "=".into() },
                            SplitPart::Slot { slot: 1 },
                        ],
                    },
                ],
                conclusion: Conclusion::Fact {
                    name: "kv".into(),
                    args: vec![Pattern::var(0)],
                    value: Pattern::var(1),
                },
            },
            Rule::Unary {
                premise: Premise {
                    name: "kv".into(),
                    args: vec![Pattern::Wildcard],
                    value: Pattern::var(0),
                },
                conclusion: Conclusion::Intermediate {
                    name: "$seen".into(),
                    args: vec![Pattern::var(0)],
                },
            },
        ],
        demands: vec!["$done".into()],
        forbids: vec!["$bad".into()],
    }
}

#[test]
fn json_round_trip_preserves_program() {
    let program = sample();
    let text = serde_json::to_string(&program).unwrap();
    let back: Program = serde_json::from_str(&text).unwrap();
    assert_eq!(back, program);
    assert!(back.validate().is_ok());
}

#[test]
fn instructions_are_tagged_by_op() {
    let value = serde_json::to_value(&sample().rules[0]).unwrap();
    assert_eq!(value["type"], json!("run"));
    assert_eq!(value["instructions"][0]["op"], json!("const"));
    assert_eq!(value["instructions"][1]["op"], json!("split"));
    assert_eq!(
        value["instructions"][1]["parts"][1],
        json!({"type": "literal", "text": "="})
    );
}

#[test]
fn large_integers_use_decimal_strings() {
    let small = serde_json::to_value(Pattern::int(42)).unwrap();
    assert_eq!(small, json!({"type": "int", "value": 42}));

    let big: Pattern = serde_json::from_value(json!({"type": "int", "value": "123456789012345678901234"})).unwrap();
    let again = serde_json::to_value(&big).unwrap();
    assert_eq!(again["value"], json!("123456789012345678901234"));
}

#[test]
fn validation_names_the_offending_rule() {
    let mut program = sample();
    program.rules.push(Rule::Unary {
        premise: Premise {
            name: "p".into(),
            args: vec![],
            value: Pattern::Trivial,
        },
        conclusion: Conclusion::Fact {
            name: "q".into(),
            args: vec![],
            value: Pattern::var(4),
        },
    });

    let err = program.validate().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Malformed(_)));
    let context = err.context.unwrap();
    assert_eq!(context.stack, vec!["rule 2".to_string()]);
}
