//! Programs written in the wire format a compiler emits

use choicelog_language::Program;
use serde_json::{Value, json};

pub fn from_json(value: Value) -> Program {
    serde_json::from_value(value).unwrap()
}

fn atom(name: &str) -> Value {
    json!({"type": "const", "name": name})
}

/// A rule that fires once on the `$go` seed.
fn on_go(conclusion: Value) -> Value {
    json!({
        "type": "run",
        "intermediate": "$go",
        "vars": [],
        "instructions": [],
        "conclusion": conclusion,
    })
}

/// `coin is? {heads, tails}`
pub fn coin() -> Program {
    from_json(json!({
        "seeds": ["$go"],
        "rules": [on_go(json!({
            "type": "choice",
            "name": "coin",
            "values": [atom("heads"), atom("tails")],
            "exhaustive": false,
        }))],
    }))
}

/// `only is {one}`
pub fn single_candidate() -> Program {
    from_json(json!({
        "seeds": ["$go"],
        "rules": [on_go(json!({
            "type": "choice",
            "name": "only",
            "values": [atom("one")],
            "exhaustive": true,
        }))],
    }))
}

/// The coin program with `$go` forbidden.
pub fn always_forbidden() -> Program {
    let mut program = coin();
    program.forbids.push("$go".into());
    program
}

/// The coin program demanding an intermediate nothing derives.
pub fn unmet_demand() -> Program {
    let mut program = coin();
    program.demands.push("$never".into());
    program
}

/// `coin is? {heads, tails}` with `$won` demanded and derived from heads.
pub fn demands_heads() -> Program {
    let mut program = coin();
    program.rules.push(from_rule(json!({
        "type": "unary",
        "premise": {"name": "coin", "value": atom("heads")},
        "conclusion": {"type": "intermediate", "name": "$won"},
    })));
    program.demands.push("$won".into());
    program
}

/// `p is a` and `p is b` together.
pub fn conflicting_facts() -> Program {
    from_json(json!({
        "seeds": ["$go"],
        "rules": [
            on_go(json!({"type": "fact", "name": "p", "value": atom("a")})),
            on_go(json!({"type": "fact", "name": "p", "value": atom("b")})),
        ],
    }))
}

/// Derives `equal` or `distinct` for `left` and `right` through `Run` and
/// `RunForFailure` rules over the same guard.
pub fn compare(left: i64, right: i64) -> Program {
    let guard = json!([
        {"op": "const", "value": {"type": "int", "value": left}},
        {"op": "const", "value": {"type": "int", "value": right}},
        {"op": "equal"},
    ]);
    from_json(json!({
        "seeds": ["$go"],
        "rules": [
            {
                "type": "run",
                "intermediate": "$go",
                "vars": [],
                "instructions": guard,
                "conclusion": {"type": "fact", "name": "equal"},
            },
            {
                "type": "run_for_failure",
                "intermediate": "$go",
                "vars": [],
                "instructions": guard,
                "conclusion": {"type": "fact", "name": "distinct"},
            },
        ],
    }))
}

/// Sums `2^62 + 2^62`, past every machine integer width.
pub fn big_sum() -> Program {
    let half = json!({"type": "int", "value": "4611686018427387904"});
    from_json(json!({
        "seeds": ["$go"],
        "rules": [{
            "type": "run",
            "intermediate": "$go",
            "vars": [],
            "instructions": [
                {"op": "const", "value": half},
                {"op": "const", "value": half},
                {"op": "plus", "arity": 2},
                {"op": "store", "slot": 0},
            ],
            "conclusion": {
                "type": "fact",
                "name": "total",
                "value": {"type": "var", "slot": 0},
            },
        }],
    }))
}

fn from_rule(value: Value) -> choicelog_language::Rule {
    serde_json::from_value(value).unwrap()
}
