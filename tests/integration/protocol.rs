//! The worker protocol, driven with JSON messages

use choicelog_runtime::{Request, Response, Worker};
use serde_json::{Value, json};

use crate::programs;

fn send(worker: &mut Worker, message: Value) -> Vec<Value> {
    let request: Request = serde_json::from_value(message).unwrap();
    encode(worker.handle(request))
}

fn encode(responses: Vec<Response>) -> Vec<Value> {
    responses
        .into_iter()
        .map(|response| serde_json::to_value(response).unwrap())
        .collect()
}

fn load_message(program: &choicelog_language::Program) -> Value {
    let mut message = serde_json::to_value(program).unwrap();
    message["type"] = json!("load");
    message
}

fn drain(worker: &mut Worker) -> Vec<Value> {
    let mut messages = Vec::new();
    while worker.is_running() {
        messages.extend(encode(worker.poll(2)));
    }
    messages
}

fn types(messages: &[Value]) -> Vec<&str> {
    messages
        .iter()
        .map(|message| message["type"].as_str().unwrap())
        .collect()
}

#[test]
fn load_start_and_drain() {
    let mut worker = Worker::new();
    assert!(send(&mut worker, load_message(&programs::coin())).is_empty());
    assert!(send(&mut worker, json!({"type": "start"})).is_empty());

    let messages = drain(&mut worker);
    assert_eq!(types(&messages), vec!["solution", "solution", "stats", "done"]);

    let stats = &messages[2]["stats"];
    assert_eq!(stats["solutions"], json!(2));
    assert_eq!(stats["dead_ends"], json!(1));

    let fact = &messages[0]["facts"][0];
    assert_eq!(fact["name"], json!("coin"));
}

#[test]
fn stop_then_resume_finishes_the_search() {
    let mut worker = Worker::new();
    send(&mut worker, load_message(&programs::coin()));
    send(&mut worker, json!({"type": "start"}));

    let mut messages = encode(worker.poll(1));
    let paused = send(&mut worker, json!({"type": "stop"}));
    assert_eq!(types(&paused), vec!["stats"]);
    assert!(worker.poll(64).is_empty());

    send(&mut worker, json!({"type": "start"}));
    messages.extend(drain(&mut worker));
    let solutions = types(&messages)
        .into_iter()
        .filter(|kind| *kind == "solution")
        .count();
    assert_eq!(solutions, 2);
    assert_eq!(types(&messages).last(), Some(&"done"));
}

#[test]
fn finished_worker_keeps_answering() {
    let mut worker = Worker::new();
    send(&mut worker, load_message(&programs::single_candidate()));
    send(&mut worker, json!({"type": "start"}));
    drain(&mut worker);

    assert!(worker.is_finished());
    assert_eq!(send(&mut worker, json!({"type": "start"})), vec![json!({"type": "done"})]);
    assert_eq!(types(&send(&mut worker, json!({"type": "stop"}))), vec!["stats"]);
}

#[test]
fn malformed_program_is_reported() {
    let mut worker = Worker::new();
    let message = json!({
        "type": "load",
        "rules": [{
            "type": "run",
            "intermediate": "$go",
            "vars": [],
            "instructions": [{"op": "load", "slot": 0}],
            "conclusion": {"type": "intermediate", "name": "$x"},
        }],
    });

    let responses = send(&mut worker, message);
    assert_eq!(types(&responses), vec!["error"]);
    assert!(
        responses[0]["message"]
            .as_str()
            .unwrap()
            .contains("unbound slot 0")
    );
    assert!(worker.is_terminated());
    assert_eq!(types(&send(&mut worker, json!({"type": "start"}))), vec!["error"]);
}

#[test]
fn start_before_load_is_an_error() {
    let mut worker = Worker::new();
    let responses = send(&mut worker, json!({"type": "start"}));
    assert_eq!(types(&responses), vec!["error"]);
    assert!(worker.is_terminated());
}
