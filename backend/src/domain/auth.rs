//! Caller identity for the ownership gate.

use super::{Job, User};

/// The identity a mutation runs under.
///
/// The REST blueprint is unauthenticated by contract and runs as
/// [`Caller::System`]; the browser surface always passes the session user.
#[derive(Debug, Clone)]
pub enum Caller {
    /// Trusted in-process caller; bypasses the ownership gate.
    System,
    /// An authenticated colonist.
    User(User),
}

impl Caller {
    /// Ownership gate: a job may be mutated by its team leader or by an
    /// administrator. This is a flat rule, not a role hierarchy.
    pub fn may_modify(&self, job: &Job) -> bool {
        match self {
            Self::System => true,
            Self::User(user) => user.is_admin || user.id == job.team_leader,
        }
    }
}
