//! The cooperative worker protocol.
//!
//! A host drives a [`Worker`] with [`Request`]s and receives [`Response`]s.
//! `load` must come first and exactly once. Between requests the host calls
//! [`Worker::poll`] to spend a bounded amount of solving work while the
//! worker is running.
//!
//! Any fault moves the worker to a terminal state: it answers the fault with
//! [`Response::Error`] and every later request with another error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use choicelog_engine::SolverStats;
use choicelog_foundation::Error;
use choicelog_language::Program;

use crate::json::Fact;
use crate::session::Session;

/// A message from the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Load the program. Must be the first request.
    Load(Program),
    /// Start or resume solving.
    Start,
    /// Pause solving and report statistics.
    Stop,
}

/// A message to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// The worker failed and has terminated.
    Error {
        /// Diagnostic.
        message: String,
    },
    /// Statistics so far.
    Stats {
        /// The counters.
        stats: SolverStats,
    },
    /// A solution.
    Solution {
        /// The solution's facts.
        facts: Vec<Fact>,
    },
    /// The search is exhausted.
    Done,
}

enum State {
    AwaitingLoad,
    Loaded { session: Session, running: bool },
    Finished { stats: SolverStats },
    Terminated,
}

/// Protocol state machine around a [`Session`].
pub struct Worker {
    state: State,
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}

impl Worker {
    /// Creates a worker waiting for `load`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::AwaitingLoad,
        }
    }

    /// Handles one request.
    pub fn handle(&mut self, request: Request) -> Vec<Response> {
        let state = std::mem::replace(&mut self.state, State::Terminated);
        let (state, responses) = match (state, request) {
            (State::Terminated, _) => (
                State::Terminated,
                vec![error(&Error::protocol("worker has terminated"))],
            ),
            (State::AwaitingLoad, Request::Load(program)) => match Session::new(&program) {
                Ok(session) => (
                    State::Loaded {
                        session,
                        running: false,
                    },
                    Vec::new(),
                ),
                Err(err) => (State::Terminated, vec![error(&err)]),
            },
            (State::AwaitingLoad, _) => (
                State::Terminated,
                vec![error(&Error::protocol("expected load as the first request"))],
            ),
            (State::Loaded { .. } | State::Finished { .. }, Request::Load(_)) => (
                State::Terminated,
                vec![error(&Error::protocol("program already loaded"))],
            ),
            (State::Loaded { session, .. }, Request::Start) => (
                State::Loaded {
                    session,
                    running: true,
                },
                Vec::new(),
            ),
            (State::Loaded { session, .. }, Request::Stop) => {
                let stats = session.stats();
                (
                    State::Loaded {
                        session,
                        running: false,
                    },
                    vec![Response::Stats { stats }],
                )
            }
            (State::Finished { stats }, Request::Start) => {
                (State::Finished { stats }, vec![Response::Done])
            }
            (State::Finished { stats }, Request::Stop) => {
                (State::Finished { stats }, vec![Response::Stats { stats }])
            }
        };
        if matches!(state, State::Terminated) {
            debug!("worker terminated");
        }
        self.state = state;
        responses
    }

    /// Spends at most `budget` cycles of work if the worker is running.
    ///
    /// Reports a solution when one is reached, and statistics followed by
    /// [`Response::Done`] when the search is exhausted.
    pub fn poll(&mut self, budget: usize) -> Vec<Response> {
        let State::Loaded {
            session,
            running: true,
        } = &mut self.state
        else {
            return Vec::new();
        };

        match session.step(budget) {
            Ok(report) => {
                let mut responses = Vec::new();
                if let Some(facts) = report.solution {
                    responses.push(Response::Solution { facts });
                }
                if report.exhausted {
                    responses.push(Response::Stats {
                        stats: report.stats,
                    });
                    responses.push(Response::Done);
                    self.state = State::Finished {
                        stats: report.stats,
                    };
                }
                responses
            }
            Err(err) => {
                debug!(%err, "worker terminated");
                self.state = State::Terminated;
                vec![error(&err)]
            }
        }
    }

    /// Returns true if the worker is loaded and running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Loaded { running: true, .. })
    }

    /// Returns true if the worker has terminated.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, State::Terminated)
    }

    /// Returns true if the search finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished { .. })
    }
}

fn error(err: &Error) -> Response {
    Response::Error {
        message: err.to_string(),
    }
}
