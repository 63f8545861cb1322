//! # panelflow-state: Panel Lifecycle Transition Rules
//!
//! The rule set governing how a panel's status may change and who may
//! change it.
//!
//! ## Components
//!
//! - **Graph** (`graph.rs`): the declared status transitions, as a constant
//!   table indexed by ordinal.
//!
//! - **Roles** (`roles.rs`): the destination statuses each role may set,
//!   as a constant table. `Administrator` is exempt.
//!
//! - **Validator** (`validator.rs`): `validate_transition`,
//!   `validate_transition_for_role`, `validate_transition_with_history`,
//!   `next_statuses`, and `next_statuses_for_role`, including the
//!   Administrator forward closure and On Hold resumption to the previous
//!   status.
//!
//! ## Design
//!
//! Panel statuses arrive as persisted ordinals from an external store and the
//! legal moves depend on the acting role, so the rules are data plus pure
//! functions returning `Result` rather than typestate. Nothing here holds
//! state; every function is safe to call concurrently.

pub mod error;
pub mod graph;
pub mod roles;
pub mod validator;

pub use error::{TransitionError, TransitionErrorKind};
pub use graph::{edges, has_edge, TRANSITION_GRAPH};
pub use roles::{destinations, is_administrator, ADMINISTRATOR, ROLE_TABLE, STORE_SITE};
pub use validator::{
    broken_at_site_precondition, forward_closure, next_statuses, next_statuses_for_role,
    validate_transition, validate_transition_for_role, validate_transition_with_history,
};
