//! Single authorization gate for every role-sensitive operation.
//!
//! Handlers call [`check`] before touching data. It verifies the actor's role
//! and, when the operation targets a resource owned by a doctor or patient
//! profile, that the actor is that owner.

use tracing::warn;
use uuid::Uuid;

use shared_models::auth::{Actor, Role};
use shared_models::error::AppError;

/// Returns the actor's profile id for `required_role`.
///
/// Fails with `Forbidden` when the actor holds another role, has no profile,
/// or does not own `resource_owner`.
pub fn check(actor: &Actor, required_role: Role, resource_owner: Option<Uuid>) -> Result<Uuid, AppError> {
    let profile_id = match (actor.role == required_role, actor.profile_id) {
        (true, Some(id)) if required_role != Role::Unassigned => id,
        _ => {
            warn!(
                "User {} with role {} denied {}-only operation",
                actor.user_id, actor.role, required_role
            );
            return Err(AppError::Forbidden(format!("User is not a {}", required_role)));
        }
    };

    if let Some(owner) = resource_owner {
        if owner != profile_id {
            warn!(
                "{} {} denied access to resource owned by {}",
                required_role, profile_id, owner
            );
            return Err(AppError::Forbidden("Permission denied".to_string()));
        }
    }

    Ok(profile_id)
}

/// For operations open to both doctors and patients.
pub fn check_any(actor: &Actor) -> Result<(Role, Uuid), AppError> {
    match (actor.role, actor.profile_id) {
        (Role::Doctor | Role::Patient, Some(id)) => Ok((actor.role, id)),
        _ => {
            warn!("User {} is neither a doctor nor a patient", actor.user_id);
            Err(AppError::Forbidden("User is neither a doctor nor a patient".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::test_utils::TestUser;

    #[test]
    fn doctor_passes_doctor_gate() {
        let actor = TestUser::doctor("d@example.com").to_actor();
        let id = check(&actor, Role::Doctor, None).unwrap();
        assert_eq!(Some(id), actor.doctor_id());
    }

    #[test]
    fn patient_fails_doctor_gate() {
        let actor = TestUser::patient("p@example.com").to_actor();
        assert_matches!(
            check(&actor, Role::Doctor, None),
            Err(AppError::Forbidden(msg)) if msg == "User is not a doctor"
        );
    }

    #[test]
    fn owner_mismatch_is_forbidden() {
        let actor = TestUser::doctor("d@example.com").to_actor();
        assert_matches!(
            check(&actor, Role::Doctor, Some(Uuid::new_v4())),
            Err(AppError::Forbidden(msg)) if msg == "Permission denied"
        );
        assert!(check(&actor, Role::Doctor, actor.profile_id).is_ok());
    }

    #[test]
    fn unassigned_fails_every_gate() {
        let actor = TestUser::unassigned("u@example.com").to_actor();
        for role in [Role::Doctor, Role::Patient, Role::Unassigned] {
            assert_matches!(check(&actor, role, None), Err(AppError::Forbidden(_)));
        }
        assert_matches!(check_any(&actor), Err(AppError::Forbidden(_)));
    }

    #[test]
    fn check_any_reports_role() {
        let actor = TestUser::patient("p@example.com").to_actor();
        let (role, id) = check_any(&actor).unwrap();
        assert_eq!(role, Role::Patient);
        assert_eq!(Some(id), actor.patient_id());
    }
}
