use crate::{
    AccessDenied, AuthenticationError, AuthorizationError, Role, RouteScope, SecurityContext,
};

static USER_SCOPE_ROLES: [Role; 2] = [Role::USER, Role::ADMIN];
static ADMIN_SCOPE_ROLES: [Role; 1] = [Role::ADMIN];

/// Authorities that satisfy each scope. `admin` implies user-scope access.
fn accepted_roles(scope: RouteScope) -> &'static [Role] {
    match scope {
        RouteScope::User => &USER_SCOPE_ROLES,
        RouteScope::Admin => &ADMIN_SCOPE_ROLES,
        RouteScope::Public | RouteScope::Authenticated => &[],
    }
}

/// Enforce the scope a route requires against the request's security context.
///
/// - No IO
/// - No panics
/// - Public always allows; every other scope needs a principal first.
pub fn authorize(required: RouteScope, context: &SecurityContext) -> Result<(), AccessDenied> {
    if required == RouteScope::Public {
        return Ok(());
    }

    let Some(principal) = context.principal() else {
        return Err(AuthenticationError::MissingCredentials.into());
    };

    match required {
        RouteScope::Public | RouteScope::Authenticated => Ok(()),
        RouteScope::User | RouteScope::Admin => {
            if principal.has_any_authority(accepted_roles(required)) {
                Ok(())
            } else {
                Err(AuthorizationError::InsufficientScope { required }.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Principal;
    use retailx_core::Subject;

    fn ctx(roles: &[Role]) -> SecurityContext {
        SecurityContext::authenticated(Principal::new(
            Subject::parse("a@b.com").unwrap(),
            roles.iter().cloned(),
        ))
    }

    #[test]
    fn public_allows_anyone() {
        assert_eq!(authorize(RouteScope::Public, &SecurityContext::anonymous()), Ok(()));
        assert_eq!(authorize(RouteScope::Public, &ctx(&[])), Ok(()));
    }

    #[test]
    fn anonymous_is_unauthenticated_everywhere_else() {
        for scope in [RouteScope::User, RouteScope::Admin, RouteScope::Authenticated] {
            assert_eq!(
                authorize(scope, &SecurityContext::anonymous()),
                Err(AccessDenied::Unauthenticated(AuthenticationError::MissingCredentials)),
                "{scope}"
            );
        }
    }

    #[test]
    fn admin_scope_denies_user() {
        assert_eq!(
            authorize(RouteScope::Admin, &ctx(&[Role::USER])),
            Err(AccessDenied::Forbidden(AuthorizationError::InsufficientScope {
                required: RouteScope::Admin
            }))
        );
        assert_eq!(authorize(RouteScope::Admin, &ctx(&[Role::ADMIN])), Ok(()));
    }

    #[test]
    fn admin_implies_user_scope() {
        assert_eq!(authorize(RouteScope::User, &ctx(&[Role::ADMIN])), Ok(()));
        assert_eq!(authorize(RouteScope::User, &ctx(&[Role::USER])), Ok(()));
    }

    #[test]
    fn unrecognised_roles_are_forbidden_on_scoped_routes() {
        let c = ctx(&[Role::new("auditor")]);
        assert!(matches!(authorize(RouteScope::User, &c), Err(AccessDenied::Forbidden(_))));
        assert_eq!(authorize(RouteScope::Authenticated, &c), Ok(()));
    }
}
