//! # Transition Validator
//!
//! Pure functions answering "is this transition legal" and "where can this
//! panel go next", unconditionally and scoped to a role. Inputs are raw
//! ordinals as read from the panel store; every function resolves them
//! against the catalog first and fails with `OutOfRange` otherwise.
//!
//! ## Rules
//!
//! - `current == next` is always rejected, special statuses included.
//! - Special destinations (On Hold, Cancelled, Broken at Site) bypass the
//!   graph in [`validate_transition`].
//! - Broken at Site additionally requires the Store Site role (or
//!   Administrator) and a panel that has reached Delivered and is not
//!   Cancelled.
//! - Administrator skips the role table. Beyond the graph it may skip
//!   ahead to any status in the [`forward_closure`] of the current one.
//! - Every other role needs the destination in its table row, then the
//!   graph check.
//! - On Hold has no ordinary edges. A held panel resumes only to the status
//!   it held before the hold, for every role; without that status, only
//!   special destinations remain.
//!
//! No function here reads ambient state; role and previous status are
//! always passed in.

use std::collections::BTreeSet;

use panelflow_core::Status;

use crate::error::TransitionError;
use crate::graph;
use crate::roles;

/// Check a transition against the graph and the special-status bypass.
pub fn validate_transition(current: u8, next: u8) -> Result<(), TransitionError> {
    let (from, to) = resolve_pair(current, next)?;
    check_graph(from, to)
}

/// Check a transition for an acting role.
///
/// Equivalent to [`validate_transition_with_history`] with no previous
/// status, so a held panel can only move to a special status.
pub fn validate_transition_for_role(
    current: u8,
    next: u8,
    role: &str,
) -> Result<(), TransitionError> {
    validate_transition_with_history(current, next, role, None)
}

/// Check a transition for an acting role, resolving On Hold resumption.
///
/// `previous` is the status the panel held before entering On Hold, as
/// resolved from the audit trail. It is only consulted when `current` is
/// On Hold and `next` is not a special status.
pub fn validate_transition_with_history(
    current: u8,
    next: u8,
    role: &str,
    previous: Option<Status>,
) -> Result<(), TransitionError> {
    let (from, to) = resolve_pair(current, next)?;

    let result = if from == Status::OnHold && !to.is_special() {
        check_resumption(to, role, previous)
    } else {
        check_for_role(from, to, role)
    };
    if let Err(err) = &result {
        tracing::debug!(%from, %to, role, kind = ?err.kind(), "transition rejected");
    }
    result
}

/// Destinations declared by the graph from `current`. Empty means terminal.
pub fn next_statuses(current: u8) -> Result<BTreeSet<Status>, TransitionError> {
    let from = resolve(current)?;
    Ok(graph::edges(from).iter().copied().collect())
}

/// Destinations the role may choose from `current`.
///
/// `previous` is the status the panel held before entering On Hold, as
/// resolved from the audit trail. It is only consulted when `current` is
/// On Hold, and a non-Administrator only gets it when its table row lists
/// it.
pub fn next_statuses_for_role(
    current: u8,
    role: &str,
    previous: Option<Status>,
) -> Result<BTreeSet<Status>, TransitionError> {
    let from = resolve(current)?;

    let mut candidates = if roles::is_administrator(role) {
        administrator_candidates(from, previous)
    } else {
        let allowed = roles::destinations(role).ok_or_else(|| TransitionError::UnknownRole {
            role: role.to_string(),
        })?;
        let mut set: BTreeSet<Status> = graph::edges(from)
            .iter()
            .filter(|to| allowed.contains(to))
            .copied()
            .collect();
        if from == Status::OnHold {
            set.extend(resumption_target(previous).filter(|to| allowed.contains(to)));
        }
        if role == roles::STORE_SITE
            && broken_at_site_precondition(from)
            && allowed.contains(&Status::BrokenAtSite)
        {
            set.insert(Status::BrokenAtSite);
        }
        set
    };

    candidates.remove(&from);
    Ok(candidates)
}

/// Statuses reachable from `from` by following only non-special edges to a
/// strictly greater ordinal, transitively. `from` itself is not included.
pub fn forward_closure(from: Status) -> BTreeSet<Status> {
    let mut visited = BTreeSet::new();
    let mut worklist = vec![from];

    while let Some(node) = worklist.pop() {
        for &to in graph::edges(node) {
            if to.is_special() || to <= node {
                continue;
            }
            if visited.insert(to) {
                worklist.push(to);
            }
        }
    }

    visited
}

/// Whether a panel in `from` may be declared Broken at Site.
pub fn broken_at_site_precondition(from: Status) -> bool {
    from >= Status::Delivered && from != Status::Cancelled
}

// ─── Internals ───────────────────────────────────────────────────────

fn resolve(ordinal: u8) -> Result<Status, TransitionError> {
    Status::from_ordinal(ordinal).map_err(|_| TransitionError::OutOfRange { ordinal })
}

fn resolve_pair(current: u8, next: u8) -> Result<(Status, Status), TransitionError> {
    let from = resolve(current)?;
    let to = resolve(next)?;
    if from == to {
        return Err(TransitionError::NoOpTransition { status: from });
    }
    Ok((from, to))
}

fn check_graph(from: Status, to: Status) -> Result<(), TransitionError> {
    if to.is_special() || graph::has_edge(from, to) {
        return Ok(());
    }
    Err(TransitionError::IllegalTransition {
        from,
        to,
        allowed: graph::edges(from).iter().copied().collect(),
    })
}

fn check_for_role(from: Status, to: Status, role: &str) -> Result<(), TransitionError> {
    let is_admin = roles::is_administrator(role);

    if to == Status::BrokenAtSite {
        if !is_admin && role != roles::STORE_SITE {
            return Err(unauthorized(role, to));
        }
        if !broken_at_site_precondition(from) {
            return Err(TransitionError::PreconditionNotMet { from, to });
        }
    }

    if is_admin {
        return check_administrator(from, to);
    }

    check_role_table(role, to)?;
    check_graph(from, to)
}

/// Graph edges plus the forward closure.
fn check_administrator(from: Status, to: Status) -> Result<(), TransitionError> {
    let closure = forward_closure(from);
    if to.is_special() || graph::has_edge(from, to) || closure.contains(&to) {
        return Ok(());
    }
    let mut allowed = closure;
    allowed.extend(graph::edges(from));
    Err(TransitionError::IllegalTransition { from, to, allowed })
}

/// `to` is not special; the panel is On Hold.
fn check_resumption(
    to: Status,
    role: &str,
    previous: Option<Status>,
) -> Result<(), TransitionError> {
    if !roles::is_administrator(role) {
        check_role_table(role, to)?;
    }
    let target = resumption_target(previous);
    if target == Some(to) {
        return Ok(());
    }
    let mut allowed: BTreeSet<Status> = graph::edges(Status::OnHold).iter().copied().collect();
    allowed.extend(target);
    Err(TransitionError::IllegalTransition {
        from: Status::OnHold,
        to,
        allowed,
    })
}

fn check_role_table(role: &str, to: Status) -> Result<(), TransitionError> {
    let allowed = roles::destinations(role).ok_or_else(|| TransitionError::UnknownRole {
        role: role.to_string(),
    })?;
    if allowed.contains(&to) {
        return Ok(());
    }
    Err(TransitionError::UnauthorizedRole {
        role: role.to_string(),
        to,
        allowed: allowed.iter().copied().collect(),
    })
}

/// The ordinary status a held panel may return to.
fn resumption_target(previous: Option<Status>) -> Option<Status> {
    previous.filter(|s| !s.is_special())
}

/// `UnauthorizedRole` for a known role, `UnknownRole` otherwise.
fn unauthorized(role: &str, to: Status) -> TransitionError {
    match roles::destinations(role) {
        Some(allowed) => TransitionError::UnauthorizedRole {
            role: role.to_string(),
            to,
            allowed: allowed.iter().copied().collect(),
        },
        None => TransitionError::UnknownRole {
            role: role.to_string(),
        },
    }
}

fn administrator_candidates(from: Status, previous: Option<Status>) -> BTreeSet<Status> {
    if from == Status::OnHold {
        let mut set: BTreeSet<Status> = [Status::Cancelled, Status::BrokenAtSite].into();
        set.extend(previous.filter(|s| *s != Status::OnHold));
        return set;
    }
    let mut set = forward_closure(from);
    set.extend(Status::SPECIAL);
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransitionErrorKind;
    use crate::roles::{ADMINISTRATOR, STORE_SITE};
    use panelflow_core::Status as S;
    use proptest::prelude::*;

    fn ord(s: Status) -> u8 {
        s.ordinal()
    }

    fn set(items: &[Status]) -> BTreeSet<Status> {
        items.iter().copied().collect()
    }

    // ── validate_transition ──────────────────────────────────────────

    #[test]
    fn test_out_of_range_either_side() {
        assert_eq!(
            validate_transition(12, 0),
            Err(TransitionError::OutOfRange { ordinal: 12 })
        );
        assert_eq!(
            validate_transition(0, 40),
            Err(TransitionError::OutOfRange { ordinal: 40 })
        );
    }

    #[test]
    fn test_no_op_for_special_status() {
        assert_eq!(
            validate_transition(ord(S::OnHold), ord(S::OnHold)),
            Err(TransitionError::NoOpTransition { status: S::OnHold })
        );
    }

    #[test]
    fn test_declared_edge_accepted() {
        assert!(validate_transition(ord(S::Produced), ord(S::ProceedForDelivery)).is_ok());
    }

    #[test]
    fn test_special_bypass_from_terminal() {
        assert!(validate_transition(ord(S::ApprovedFinal), ord(S::OnHold)).is_ok());
        assert!(validate_transition(ord(S::ApprovedFinal), ord(S::Cancelled)).is_ok());
        assert!(validate_transition(ord(S::Cancelled), ord(S::OnHold)).is_ok());
    }

    #[test]
    fn test_illegal_transition_carries_alternatives() {
        let err = validate_transition(ord(S::Delivered), ord(S::Installed)).unwrap_err();
        assert_eq!(
            err,
            TransitionError::IllegalTransition {
                from: S::Delivered,
                to: S::Installed,
                allowed: set(&[
                    S::ApprovedMaterial,
                    S::RejectedMaterial,
                    S::OnHold,
                    S::Cancelled,
                    S::BrokenAtSite,
                ]),
            }
        );
    }

    // ── validate_transition_for_role ─────────────────────────────────

    #[test]
    fn test_store_site_broken_after_delivery() {
        assert!(
            validate_transition_for_role(ord(S::Delivered), ord(S::BrokenAtSite), STORE_SITE)
                .is_ok()
        );
    }

    #[test]
    fn test_store_site_broken_before_delivery() {
        assert_eq!(
            validate_transition_for_role(
                ord(S::IssuedForProduction),
                ord(S::BrokenAtSite),
                STORE_SITE
            ),
            Err(TransitionError::PreconditionNotMet {
                from: S::IssuedForProduction,
                to: S::BrokenAtSite,
            })
        );
    }

    #[test]
    fn test_broken_from_cancelled_rejected() {
        let err = validate_transition_for_role(ord(S::Cancelled), ord(S::BrokenAtSite), STORE_SITE)
            .unwrap_err();
        assert_eq!(err.kind(), TransitionErrorKind::PreconditionNotMet);
    }

    #[test]
    fn test_broken_requires_store_site_role() {
        let err = validate_transition_for_role(ord(S::Installed), ord(S::BrokenAtSite), "QC Site")
            .unwrap_err();
        match err {
            TransitionError::UnauthorizedRole { role, to, allowed } => {
                assert_eq!(role, "QC Site");
                assert_eq!(to, S::BrokenAtSite);
                assert!(allowed.contains(&S::ApprovedMaterial));
            }
            other => panic!("Expected UnauthorizedRole, got: {other:?}"),
        }
    }

    #[test]
    fn test_broken_unknown_role() {
        let err = validate_transition_for_role(ord(S::Installed), ord(S::BrokenAtSite), "Visitor")
            .unwrap_err();
        assert_eq!(err.kind(), TransitionErrorKind::UnknownRole);
    }

    #[test]
    fn test_administrator_still_bound_by_broken_precondition() {
        let err = validate_transition_for_role(
            ord(S::Produced),
            ord(S::BrokenAtSite),
            ADMINISTRATOR,
        )
        .unwrap_err();
        assert_eq!(err.kind(), TransitionErrorKind::PreconditionNotMet);
    }

    #[test]
    fn test_qc_site_material_rework() {
        assert!(validate_transition_for_role(
            ord(S::ApprovedMaterial),
            ord(S::RejectedMaterial),
            "QC Site"
        )
        .is_ok());
        assert!(validate_transition_for_role(
            ord(S::RejectedMaterial),
            ord(S::ApprovedMaterial),
            "QC Site"
        )
        .is_ok());
    }

    #[test]
    fn test_administrator_cannot_jump_back_from_final() {
        let err = validate_transition_for_role(
            ord(S::ApprovedFinal),
            ord(S::Installed),
            ADMINISTRATOR,
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::IllegalTransition {
                from: S::ApprovedFinal,
                to: S::Installed,
                allowed: BTreeSet::new(),
            }
        );
    }

    #[test]
    fn test_administrator_skips_role_table() {
        assert!(
            validate_transition_for_role(ord(S::Installed), ord(S::Inspected), ADMINISTRATOR)
                .is_ok()
        );
    }

    #[test]
    fn test_role_outside_destination_set() {
        let err = validate_transition_for_role(ord(S::Delivered), ord(S::ApprovedMaterial), "Logistics")
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::UnauthorizedRole {
                role: "Logistics".to_string(),
                to: S::ApprovedMaterial,
                allowed: set(&[S::ProceedForDelivery, S::Delivered]),
            }
        );
    }

    #[test]
    fn test_role_authority_never_overrides_graph() {
        let err = validate_transition_for_role(
            ord(S::IssuedForProduction),
            ord(S::ApprovedFinal),
            "QC Site",
        )
        .unwrap_err();
        assert_eq!(err.kind(), TransitionErrorKind::IllegalTransition);
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert_eq!(
            validate_transition_for_role(ord(S::Produced), ord(S::ProceedForDelivery), "Visitor"),
            Err(TransitionError::UnknownRole {
                role: "Visitor".to_string()
            })
        );
    }

    #[test]
    fn test_role_no_op_checked_first() {
        let err = validate_transition_for_role(ord(S::Delivered), ord(S::Delivered), "Visitor")
            .unwrap_err();
        assert_eq!(err.kind(), TransitionErrorKind::NoOpTransition);
    }

    // ── next_statuses ────────────────────────────────────────────────

    #[test]
    fn test_next_statuses_terminal_is_empty() {
        assert!(next_statuses(ord(S::ApprovedFinal)).unwrap().is_empty());
        assert!(next_statuses(ord(S::Cancelled)).unwrap().is_empty());
        assert!(next_statuses(99).is_err());
    }

    #[test]
    fn test_next_statuses_for_role_intersects_graph() {
        let next = next_statuses_for_role(ord(S::Delivered), "QC Site", None).unwrap();
        assert_eq!(next, set(&[S::ApprovedMaterial, S::RejectedMaterial]));
    }

    #[test]
    fn test_store_site_gets_broken_injected_from_on_hold() {
        let next = next_statuses_for_role(ord(S::OnHold), STORE_SITE, None).unwrap();
        assert_eq!(next, set(&[S::BrokenAtSite]));
        let next = next_statuses_for_role(ord(S::OnHold), STORE_SITE, Some(S::Delivered)).unwrap();
        assert_eq!(next, set(&[S::Delivered, S::BrokenAtSite]));
    }

    // ── On Hold resumption ───────────────────────────────────────────

    #[test]
    fn test_held_panel_cannot_jump_to_final() {
        let err = validate_transition_with_history(
            ord(S::OnHold),
            ord(S::ApprovedFinal),
            "QC Site",
            Some(S::IssuedForProduction),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::IllegalTransition {
                from: S::OnHold,
                to: S::ApprovedFinal,
                allowed: set(&[S::IssuedForProduction, S::Cancelled, S::BrokenAtSite]),
            }
        );
        assert_eq!(
            validate_transition_for_role(ord(S::OnHold), ord(S::ApprovedFinal), "QC Site")
                .unwrap_err()
                .kind(),
            TransitionErrorKind::IllegalTransition
        );
    }

    #[test]
    fn test_any_authorized_role_resumes_to_previous() {
        assert!(validate_transition_with_history(
            ord(S::OnHold),
            ord(S::IssuedForProduction),
            "Planning Engineer",
            Some(S::IssuedForProduction),
        )
        .is_ok());
        assert!(validate_transition_with_history(
            ord(S::OnHold),
            ord(S::Installed),
            ADMINISTRATOR,
            Some(S::Installed),
        )
        .is_ok());
    }

    #[test]
    fn test_resumption_still_needs_role_table() {
        let err = validate_transition_with_history(
            ord(S::OnHold),
            ord(S::Installed),
            "Logistics",
            Some(S::Installed),
        )
        .unwrap_err();
        assert_eq!(err.kind(), TransitionErrorKind::UnauthorizedRole);
    }

    #[test]
    fn test_resumption_without_previous_is_illegal_for_administrator() {
        let err = validate_transition_for_role(ord(S::OnHold), ord(S::Delivered), ADMINISTRATOR)
            .unwrap_err();
        assert_eq!(err.kind(), TransitionErrorKind::IllegalTransition);
    }

    #[test]
    fn test_non_admin_candidates_from_hold_follow_previous() {
        let next =
            next_statuses_for_role(ord(S::OnHold), "QC Site", Some(S::IssuedForProduction))
                .unwrap();
        assert!(next.is_empty());
        let next = next_statuses_for_role(ord(S::OnHold), "Planning Engineer", Some(S::Produced))
            .unwrap();
        assert_eq!(next, set(&[S::Produced]));
    }

    #[test]
    fn test_store_site_no_broken_before_delivery() {
        let next = next_statuses_for_role(ord(S::ProceedForDelivery), STORE_SITE, None).unwrap();
        assert_eq!(next, set(&[S::Delivered]));
    }

    #[test]
    fn test_next_statuses_for_unknown_role() {
        assert_eq!(
            next_statuses_for_role(ord(S::Produced), "Visitor", None).unwrap_err().kind(),
            TransitionErrorKind::UnknownRole
        );
    }

    // ── Administrator forward closure ────────────────────────────────

    #[test]
    fn test_forward_closure_from_start_reaches_final() {
        let closure = forward_closure(S::IssuedForProduction);
        assert_eq!(
            closure,
            set(&[
                S::Produced,
                S::ProceedForDelivery,
                S::Delivered,
                S::ApprovedMaterial,
                S::RejectedMaterial,
                S::Installed,
                S::Inspected,
                S::ApprovedFinal,
            ])
        );
    }

    #[test]
    fn test_forward_closure_skips_backward_edge() {
        // Rejected → Approved is a declared edge but goes backwards.
        assert!(forward_closure(S::RejectedMaterial).is_empty());
    }

    #[test]
    fn test_forward_closure_of_broken_is_empty() {
        assert!(forward_closure(S::BrokenAtSite).is_empty());
    }

    #[test]
    fn test_administrator_candidates_from_delivered() {
        let next = next_statuses_for_role(ord(S::Delivered), ADMINISTRATOR, None).unwrap();
        assert_eq!(
            next,
            set(&[
                S::ApprovedMaterial,
                S::RejectedMaterial,
                S::Installed,
                S::Inspected,
                S::ApprovedFinal,
                S::OnHold,
                S::Cancelled,
                S::BrokenAtSite,
            ])
        );
    }

    #[test]
    fn test_administrator_skips_ahead_through_closure() {
        for to in [S::Installed, S::Inspected, S::ApprovedFinal] {
            assert!(
                validate_transition_for_role(ord(S::Delivered), ord(to), ADMINISTRATOR).is_ok(),
                "Delivered -> {to}"
            );
        }
        assert!(
            validate_transition_for_role(ord(S::Delivered), ord(S::Inspected), "QC Site").is_err()
        );
    }

    #[test]
    fn test_administrator_backward_jump_lists_closure() {
        let err = validate_transition_for_role(ord(S::Installed), ord(S::Delivered), ADMINISTRATOR)
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::IllegalTransition {
                from: S::Installed,
                to: S::Delivered,
                allowed: set(&[
                    S::Inspected,
                    S::ApprovedFinal,
                    S::OnHold,
                    S::Cancelled,
                    S::BrokenAtSite,
                ]),
            }
        );
    }

    #[test]
    fn test_administrator_candidates_exclude_current_special() {
        let next = next_statuses_for_role(ord(S::Cancelled), ADMINISTRATOR, None).unwrap();
        assert_eq!(next, set(&[S::OnHold, S::BrokenAtSite]));
    }

    #[test]
    fn test_on_hold_resumption_carve_out() {
        let next =
            next_statuses_for_role(ord(S::OnHold), ADMINISTRATOR, Some(S::Installed)).unwrap();
        assert_eq!(next, set(&[S::Installed, S::Cancelled, S::BrokenAtSite]));
    }

    #[test]
    fn test_on_hold_without_previous() {
        let next = next_statuses_for_role(ord(S::OnHold), ADMINISTRATOR, None).unwrap();
        assert_eq!(next, set(&[S::Cancelled, S::BrokenAtSite]));
    }

    // ── Properties ───────────────────────────────────────────────────

    fn any_status() -> impl Strategy<Value = Status> {
        (0..Status::COUNT).prop_map(|o| Status::ALL[usize::from(o)])
    }

    fn any_role() -> impl Strategy<Value = String> {
        let mut names: Vec<String> = roles::ROLE_TABLE
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        names.push(ADMINISTRATOR.to_string());
        names.push("Visitor".to_string());
        proptest::sample::select(names)
    }

    proptest! {
        #[test]
        fn self_transition_is_always_no_op(s in any_status(), role in any_role()) {
            prop_assert_eq!(
                validate_transition(ord(s), ord(s)),
                Err(TransitionError::NoOpTransition { status: s })
            );
            prop_assert_eq!(
                validate_transition_for_role(ord(s), ord(s), &role),
                Err(TransitionError::NoOpTransition { status: s })
            );
        }

        #[test]
        fn role_success_implies_table_membership(
            from in any_status(),
            to in any_status(),
            role in any_role(),
            previous in proptest::option::of(any_status()),
        ) {
            if validate_transition_with_history(ord(from), ord(to), &role, previous).is_ok()
                && role != ADMINISTRATOR
            {
                let allowed = roles::destinations(&role);
                prop_assert!(allowed.is_some_and(|a| a.contains(&to)));
            }
        }

        #[test]
        fn listed_candidates_exclude_current(from in any_status(), role in any_role()) {
            if let Ok(next) = next_statuses_for_role(ord(from), &role, None) {
                prop_assert!(!next.contains(&from));
            }
        }

        #[test]
        fn administrator_non_special_candidates_move_forward(
            from in any_status(),
            previous in proptest::option::of(any_status()),
        ) {
            prop_assume!(from != S::OnHold);
            let next = next_statuses_for_role(ord(from), ADMINISTRATOR, previous).unwrap();
            for to in next.iter().filter(|s| !s.is_special()) {
                prop_assert!(*to > from, "{} listed from {}", to, from);
            }
        }

        #[test]
        fn listed_candidates_validate(
            from in any_status(),
            role in any_role(),
            previous in proptest::option::of(any_status()),
        ) {
            prop_assume!(previous != Some(S::OnHold));
            if let Ok(next) = next_statuses_for_role(ord(from), &role, previous) {
                for to in next {
                    // Administrator is offered Broken at Site unconditionally.
                    if to == S::BrokenAtSite && !broken_at_site_precondition(from) {
                        continue;
                    }
                    prop_assert!(
                        validate_transition_with_history(ord(from), ord(to), &role, previous)
                            .is_ok(),
                        "{} -> {} listed for {} but rejected", from, to, role
                    );
                }
            }
        }
    }
}
