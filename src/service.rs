//! The security operation contract.
//!
//! [`SecurityService`] is implemented by the real authentication and
//! permission backend and, with identical semantics, by
//! [`AuditedSecurityService`](crate::AuditedSecurityService) which wraps it.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::credentials::Credentials;
use crate::error::{InitializeError, SecurityResult};
use crate::permission::{Authorizations, SystemPermission, TablePermission};

/// Authentication, authorization and permission management operations.
///
/// Every operation takes the caller's [`Credentials`] plus its own
/// arguments and either returns a value or fails with a
/// [`SecurityError`](crate::SecurityError).
pub trait SecurityService: Send + Sync {
    /// Verifies `password` for `user`. Returns `false` for a mismatch.
    fn authenticate_user(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
    ) -> SecurityResult<bool>;

    /// Returns the authorizations held by `user`.
    fn get_user_authorizations(
        &self,
        credentials: &Credentials,
        user: &str,
    ) -> SecurityResult<Authorizations>;

    /// Returns the authorizations held by the calling user.
    ///
    /// Backends may answer this differently from a named lookup, e.g. when
    /// reading one's own authorizations needs no permission.
    fn get_own_authorizations(&self, credentials: &Credentials) -> SecurityResult<Authorizations> {
        self.get_user_authorizations(credentials, credentials.user())
    }

    /// Replaces the authorizations held by `user`.
    fn change_authorizations(
        &self,
        credentials: &Credentials,
        user: &str,
        authorizations: &Authorizations,
    ) -> SecurityResult<()>;

    /// Sets a new password for `user`.
    fn change_password(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
    ) -> SecurityResult<()>;

    /// Creates `user` with an initial password and authorizations.
    fn create_user(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
        authorizations: &Authorizations,
    ) -> SecurityResult<()>;

    /// Removes `user` and everything it holds.
    fn drop_user(&self, credentials: &Credentials, user: &str) -> SecurityResult<()>;

    /// Grants an instance-wide permission to `user`.
    fn grant_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<()>;

    /// Grants a permission on `table` to `user`.
    fn grant_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<()>;

    /// Revokes an instance-wide permission from `user`.
    fn revoke_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<()>;

    /// Revokes a permission on `table` from `user`.
    fn revoke_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<()>;

    /// Checks whether `user` holds an instance-wide permission.
    fn has_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<bool>;

    /// Checks whether `user` holds a permission on `table`.
    fn has_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<bool>;

    /// Lists every known user.
    fn list_users(&self, credentials: &Credentials) -> SecurityResult<BTreeSet<String>>;

    /// Removes all permissions recorded against `table`.
    fn delete_table(&self, credentials: &Credentials, table: &str) -> SecurityResult<()>;

    /// Bootstraps the security stores with the root user.
    ///
    /// Runs once per instance. Unlike the other operations this can also
    /// fail with [`InitializeError::Bootstrap`].
    fn initialize_security(
        &self,
        credentials: &Credentials,
        root_user: &str,
        root_password: &[u8],
    ) -> Result<(), InitializeError>;
}

macro_rules! forward_security_service {
    ($ptr:ident) => {
        impl<S: SecurityService + ?Sized> SecurityService for $ptr<S> {
            fn authenticate_user(
                &self,
                credentials: &Credentials,
                user: &str,
                password: &[u8],
            ) -> SecurityResult<bool> {
                (**self).authenticate_user(credentials, user, password)
            }

            fn get_user_authorizations(
                &self,
                credentials: &Credentials,
                user: &str,
            ) -> SecurityResult<Authorizations> {
                (**self).get_user_authorizations(credentials, user)
            }

            fn get_own_authorizations(
                &self,
                credentials: &Credentials,
            ) -> SecurityResult<Authorizations> {
                (**self).get_own_authorizations(credentials)
            }

            fn change_authorizations(
                &self,
                credentials: &Credentials,
                user: &str,
                authorizations: &Authorizations,
            ) -> SecurityResult<()> {
                (**self).change_authorizations(credentials, user, authorizations)
            }

            fn change_password(
                &self,
                credentials: &Credentials,
                user: &str,
                password: &[u8],
            ) -> SecurityResult<()> {
                (**self).change_password(credentials, user, password)
            }

            fn create_user(
                &self,
                credentials: &Credentials,
                user: &str,
                password: &[u8],
                authorizations: &Authorizations,
            ) -> SecurityResult<()> {
                (**self).create_user(credentials, user, password, authorizations)
            }

            fn drop_user(&self, credentials: &Credentials, user: &str) -> SecurityResult<()> {
                (**self).drop_user(credentials, user)
            }

            fn grant_system_permission(
                &self,
                credentials: &Credentials,
                user: &str,
                permission: SystemPermission,
            ) -> SecurityResult<()> {
                (**self).grant_system_permission(credentials, user, permission)
            }

            fn grant_table_permission(
                &self,
                credentials: &Credentials,
                user: &str,
                table: &str,
                permission: TablePermission,
            ) -> SecurityResult<()> {
                (**self).grant_table_permission(credentials, user, table, permission)
            }

            fn revoke_system_permission(
                &self,
                credentials: &Credentials,
                user: &str,
                permission: SystemPermission,
            ) -> SecurityResult<()> {
                (**self).revoke_system_permission(credentials, user, permission)
            }

            fn revoke_table_permission(
                &self,
                credentials: &Credentials,
                user: &str,
                table: &str,
                permission: TablePermission,
            ) -> SecurityResult<()> {
                (**self).revoke_table_permission(credentials, user, table, permission)
            }

            fn has_system_permission(
                &self,
                credentials: &Credentials,
                user: &str,
                permission: SystemPermission,
            ) -> SecurityResult<bool> {
                (**self).has_system_permission(credentials, user, permission)
            }

            fn has_table_permission(
                &self,
                credentials: &Credentials,
                user: &str,
                table: &str,
                permission: TablePermission,
            ) -> SecurityResult<bool> {
                (**self).has_table_permission(credentials, user, table, permission)
            }

            fn list_users(&self, credentials: &Credentials) -> SecurityResult<BTreeSet<String>> {
                (**self).list_users(credentials)
            }

            fn delete_table(&self, credentials: &Credentials, table: &str) -> SecurityResult<()> {
                (**self).delete_table(credentials, table)
            }

            fn initialize_security(
                &self,
                credentials: &Credentials,
                root_user: &str,
                root_password: &[u8],
            ) -> Result<(), InitializeError> {
                (**self).initialize_security(credentials, root_user, root_password)
            }
        }
    };
}

forward_security_service!(Box);
forward_security_service!(Arc);
