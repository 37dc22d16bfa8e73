use super::domain::UserProfile;

/// Role a caller must hold to invoke an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// Administrative staff reviewing requests and generating documents.
    Administrator,
    /// End users submitting and following their own requests.
    Requester,
}

/// Raised when the caller's role does not match the operation's requirement.
#[derive(Debug, thiserror::Error)]
pub enum PolicyViolation {
    #[error("operation is restricted to administrators")]
    AdministratorOnly,
    #[error("administrators cannot act as requesters for this operation")]
    RequesterOnly,
}

/// Single policy-evaluation step shared by every operation.
pub fn authorize(caller: &UserProfile, required: RequiredRole) -> Result<(), PolicyViolation> {
    match required {
        RequiredRole::Administrator if caller.is_admin => Ok(()),
        RequiredRole::Administrator => Err(PolicyViolation::AdministratorOnly),
        RequiredRole::Requester if !caller.is_admin => Ok(()),
        RequiredRole::Requester => Err(PolicyViolation::RequesterOnly),
    }
}
