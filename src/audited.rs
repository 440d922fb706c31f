use std::collections::BTreeSet;
use std::fmt::Display;

use crate::audit::{AuditField, AuditRecord, AuditSink, Operation, TracingAuditSink};
use crate::credentials::Credentials;
use crate::error::{InitializeError, SecurityResult};
use crate::permission::{Authorizations, SystemPermission, TablePermission};
use crate::service::SecurityService;

type Args<'a> = &'a [(AuditField, &'a dyn Display)];

/// A [`SecurityService`] that writes one audit record per call.
///
/// Every operation is delegated to the wrapped service first. Its result is
/// then audited (an `Audit` tier record on success, an `Error` tier record
/// carrying the reason code on failure) and handed back to the caller
/// unchanged. The audit record is always written before the call returns.
///
/// Security initialization is the exception: it is only noted at `Info`
/// tier after it succeeds, and its failures propagate without a record.
///
/// Wrap a service once. Wrapping an audited service again audits every
/// call twice.
///
/// # Examples
///
/// ```
/// use audited_security::audit::MemoryAuditSink;
/// use audited_security::{AuditedSecurityService, Credentials, SecurityService};
/// # use audited_security::*;
/// # use std::collections::BTreeSet;
/// # struct Backend;
/// # impl SecurityService for Backend {
/// #     fn authenticate_user(&self, _: &Credentials, _: &str, _: &[u8]) -> SecurityResult<bool> { Ok(true) }
/// #     fn get_user_authorizations(&self, _: &Credentials, _: &str) -> SecurityResult<Authorizations> { Ok(Authorizations::new()) }
/// #     fn change_authorizations(&self, _: &Credentials, _: &str, _: &Authorizations) -> SecurityResult<()> { Ok(()) }
/// #     fn change_password(&self, _: &Credentials, _: &str, _: &[u8]) -> SecurityResult<()> { Ok(()) }
/// #     fn create_user(&self, _: &Credentials, _: &str, _: &[u8], _: &Authorizations) -> SecurityResult<()> { Ok(()) }
/// #     fn drop_user(&self, _: &Credentials, _: &str) -> SecurityResult<()> { Ok(()) }
/// #     fn grant_system_permission(&self, _: &Credentials, _: &str, _: SystemPermission) -> SecurityResult<()> { Ok(()) }
/// #     fn grant_table_permission(&self, _: &Credentials, _: &str, _: &str, _: TablePermission) -> SecurityResult<()> { Ok(()) }
/// #     fn revoke_system_permission(&self, _: &Credentials, _: &str, _: SystemPermission) -> SecurityResult<()> { Ok(()) }
/// #     fn revoke_table_permission(&self, _: &Credentials, _: &str, _: &str, _: TablePermission) -> SecurityResult<()> { Ok(()) }
/// #     fn has_system_permission(&self, _: &Credentials, _: &str, _: SystemPermission) -> SecurityResult<bool> { Ok(true) }
/// #     fn has_table_permission(&self, _: &Credentials, _: &str, _: &str, _: TablePermission) -> SecurityResult<bool> { Ok(true) }
/// #     fn list_users(&self, _: &Credentials) -> SecurityResult<BTreeSet<String>> { Ok(BTreeSet::new()) }
/// #     fn delete_table(&self, _: &Credentials, _: &str) -> SecurityResult<()> { Ok(()) }
/// #     fn initialize_security(&self, _: &Credentials, _: &str, _: &[u8]) -> Result<(), InitializeError> { Ok(()) }
/// # }
///
/// let audited = AuditedSecurityService::with_sink(Backend, MemoryAuditSink::new());
/// let creds = Credentials::new("alice", b"pw".to_vec(), "instance");
///
/// assert!(audited.authenticate_user(&creds, "alice", b"pw").unwrap());
/// assert_eq!(
///     audited.sink().lines(),
///     vec!["Using credentials alice: authenticated"]
/// );
/// ```
#[derive(Debug)]
pub struct AuditedSecurityService<S, A = TracingAuditSink> {
    inner: S,
    sink: A,
}

impl<S: SecurityService> AuditedSecurityService<S> {
    /// Wraps `inner`, writing audit records to the `audit` tracing target.
    pub fn new(inner: S) -> Self {
        Self::with_sink(inner, TracingAuditSink::new())
    }
}

impl<S: SecurityService, A: AuditSink> AuditedSecurityService<S, A> {
    /// Wraps `inner`, writing audit records to `sink`.
    pub fn with_sink(inner: S, sink: A) -> Self {
        Self { inner, sink }
    }

    /// Returns the wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the audit sink.
    pub fn sink(&self) -> &A {
        &self.sink
    }

    /// Splits the decorator back into the wrapped service and its sink.
    pub fn into_parts(self) -> (S, A) {
        (self.inner, self.sink)
    }

    fn audit<T>(
        &self,
        credentials: &Credentials,
        operation: Operation,
        result: &SecurityResult<T>,
        on_success: Args<'_>,
        on_failure: Args<'_>,
    ) {
        let (record, args) = match result {
            Ok(_) => (AuditRecord::success(operation, credentials.user()), on_success),
            Err(err) => (
                AuditRecord::failure(operation, credentials.user(), err.code()),
                on_failure,
            ),
        };
        let record = args
            .iter()
            .fold(record, |record, (field, value)| record.with(*field, value));
        self.sink.emit(&record);
    }
}

impl<S: SecurityService, A: AuditSink> SecurityService for AuditedSecurityService<S, A> {
    fn authenticate_user(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
    ) -> SecurityResult<bool> {
        let result = self.inner.authenticate_user(credentials, user, password);
        let verdict = match result {
            Ok(true) => "authenticated",
            _ => "failed authentication",
        };
        self.audit(
            credentials,
            Operation::AuthenticateUser,
            &result,
            &[(AuditField::Result, &verdict)],
            &[],
        );
        result
    }

    fn get_user_authorizations(
        &self,
        credentials: &Credentials,
        user: &str,
    ) -> SecurityResult<Authorizations> {
        let result = self.inner.get_user_authorizations(credentials, user);
        self.audit(
            credentials,
            Operation::GetUserAuthorizations,
            &result,
            &[(AuditField::User, &user)],
            &[(AuditField::User, &user)],
        );
        result
    }

    fn get_own_authorizations(&self, credentials: &Credentials) -> SecurityResult<Authorizations> {
        let result = self.inner.get_own_authorizations(credentials);
        let user = credentials.user();
        self.audit(
            credentials,
            Operation::GetUserAuthorizations,
            &result,
            &[(AuditField::User, &user)],
            &[(AuditField::User, &user)],
        );
        result
    }

    fn change_authorizations(
        &self,
        credentials: &Credentials,
        user: &str,
        authorizations: &Authorizations,
    ) -> SecurityResult<()> {
        let result = self
            .inner
            .change_authorizations(credentials, user, authorizations);
        self.audit(
            credentials,
            Operation::ChangeAuthorizations,
            &result,
            &[
                (AuditField::User, &user),
                (AuditField::Authorizations, authorizations),
            ],
            &[(AuditField::User, &user)],
        );
        result
    }

    fn change_password(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
    ) -> SecurityResult<()> {
        let result = self.inner.change_password(credentials, user, password);
        self.audit(
            credentials,
            Operation::ChangePassword,
            &result,
            &[(AuditField::User, &user)],
            &[(AuditField::User, &user)],
        );
        result
    }

    fn create_user(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
        authorizations: &Authorizations,
    ) -> SecurityResult<()> {
        let result = self
            .inner
            .create_user(credentials, user, password, authorizations);
        self.audit(
            credentials,
            Operation::CreateUser,
            &result,
            &[],
            &[(AuditField::User, &user)],
        );
        result
    }

    fn drop_user(&self, credentials: &Credentials, user: &str) -> SecurityResult<()> {
        let result = self.inner.drop_user(credentials, user);
        self.audit(
            credentials,
            Operation::DropUser,
            &result,
            &[],
            &[(AuditField::User, &user)],
        );
        result
    }

    fn grant_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<()> {
        let result = self
            .inner
            .grant_system_permission(credentials, user, permission);
        let args: Args<'_> = &[
            (AuditField::Permission, &permission),
            (AuditField::User, &user),
        ];
        self.audit(
            credentials,
            Operation::GrantSystemPermission,
            &result,
            args,
            args,
        );
        result
    }

    fn grant_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<()> {
        let result = self
            .inner
            .grant_table_permission(credentials, user, table, permission);
        self.audit(
            credentials,
            Operation::GrantTablePermission,
            &result,
            &[
                (AuditField::Permission, &permission),
                (AuditField::Table, &table),
                (AuditField::User, &user),
            ],
            &[
                (AuditField::Permission, &permission),
                (AuditField::Table, &table),
            ],
        );
        result
    }

    fn revoke_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<()> {
        let result = self
            .inner
            .revoke_system_permission(credentials, user, permission);
        let args: Args<'_> = &[
            (AuditField::Permission, &permission),
            (AuditField::User, &user),
        ];
        self.audit(
            credentials,
            Operation::RevokeSystemPermission,
            &result,
            args,
            args,
        );
        result
    }

    fn revoke_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<()> {
        let result = self
            .inner
            .revoke_table_permission(credentials, user, table, permission);
        self.audit(
            credentials,
            Operation::RevokeTablePermission,
            &result,
            &[
                (AuditField::Permission, &permission),
                (AuditField::Table, &table),
                (AuditField::User, &user),
            ],
            &[
                (AuditField::Permission, &permission),
                (AuditField::Table, &table),
            ],
        );
        result
    }

    fn has_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<bool> {
        let result = self
            .inner
            .has_system_permission(credentials, user, permission);
        let args: Args<'_> = &[
            (AuditField::Permission, &permission),
            (AuditField::User, &user),
        ];
        self.audit(
            credentials,
            Operation::HasSystemPermission,
            &result,
            args,
            args,
        );
        result
    }

    fn has_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<bool> {
        let result = self
            .inner
            .has_table_permission(credentials, user, table, permission);
        self.audit(
            credentials,
            Operation::HasTablePermission,
            &result,
            &[
                (AuditField::Permission, &permission),
                (AuditField::Table, &table),
                (AuditField::User, &user),
            ],
            &[
                (AuditField::Permission, &permission),
                (AuditField::User, &user),
            ],
        );
        result
    }

    fn list_users(&self, credentials: &Credentials) -> SecurityResult<BTreeSet<String>> {
        let result = self.inner.list_users(credentials);
        self.audit(credentials, Operation::ListUsers, &result, &[], &[]);
        result
    }

    fn delete_table(&self, credentials: &Credentials, table: &str) -> SecurityResult<()> {
        let result = self.inner.delete_table(credentials, table);
        self.audit(
            credentials,
            Operation::DeleteTable,
            &result,
            &[(AuditField::Table, &table)],
            &[(AuditField::Table, &table)],
        );
        result
    }

    fn initialize_security(
        &self,
        credentials: &Credentials,
        root_user: &str,
        root_password: &[u8],
    ) -> Result<(), InitializeError> {
        self.inner
            .initialize_security(credentials, root_user, root_password)?;
        let notice = AuditRecord::info(Operation::InitializeSecurity, credentials.user())
            .with(AuditField::RootUser, root_user)
            .with(AuditField::User, credentials.user());
        self.sink.emit(&notice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditOutcome, AuditTier, MemoryAuditSink};
    use crate::error::{SecurityError, SecurityErrorCode};

    /// Backend that fails every call with one code, or succeeds with fixed values.
    ///
    /// With `self_only` set, named authorization lookups are denied while
    /// the caller may still read its own.
    struct Fixed {
        fail: Option<SecurityErrorCode>,
        self_only: bool,
    }

    impl Fixed {
        fn check(&self, user: &str) -> SecurityResult<()> {
            match self.fail {
                Some(code) => Err(SecurityError::new(user, code)),
                None => Ok(()),
            }
        }
    }

    impl SecurityService for Fixed {
        fn authenticate_user(&self, c: &Credentials, _: &str, p: &[u8]) -> SecurityResult<bool> {
            self.check(c.user()).map(|_| p == b"right")
        }

        fn get_user_authorizations(
            &self,
            c: &Credentials,
            _: &str,
        ) -> SecurityResult<Authorizations> {
            if self.self_only {
                return Err(SecurityError::new(c.user(), SecurityErrorCode::PermissionDenied));
            }
            self.check(c.user()).map(|_| Authorizations::from_labels(["a"]))
        }

        fn get_own_authorizations(&self, c: &Credentials) -> SecurityResult<Authorizations> {
            if self.self_only {
                return Ok(Authorizations::from_labels(["mine"]));
            }
            self.get_user_authorizations(c, c.user())
        }

        fn change_authorizations(
            &self,
            c: &Credentials,
            _: &str,
            _: &Authorizations,
        ) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn change_password(&self, c: &Credentials, _: &str, _: &[u8]) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn create_user(
            &self,
            c: &Credentials,
            _: &str,
            _: &[u8],
            _: &Authorizations,
        ) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn drop_user(&self, c: &Credentials, _: &str) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn grant_system_permission(
            &self,
            c: &Credentials,
            _: &str,
            _: SystemPermission,
        ) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn grant_table_permission(
            &self,
            c: &Credentials,
            _: &str,
            _: &str,
            _: TablePermission,
        ) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn revoke_system_permission(
            &self,
            c: &Credentials,
            _: &str,
            _: SystemPermission,
        ) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn revoke_table_permission(
            &self,
            c: &Credentials,
            _: &str,
            _: &str,
            _: TablePermission,
        ) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn has_system_permission(
            &self,
            c: &Credentials,
            _: &str,
            _: SystemPermission,
        ) -> SecurityResult<bool> {
            self.check(c.user()).map(|_| true)
        }

        fn has_table_permission(
            &self,
            c: &Credentials,
            _: &str,
            _: &str,
            _: TablePermission,
        ) -> SecurityResult<bool> {
            self.check(c.user()).map(|_| false)
        }

        fn list_users(&self, c: &Credentials) -> SecurityResult<BTreeSet<String>> {
            self.check(c.user())
                .map(|_| ["alice", "bob"].into_iter().map(String::from).collect())
        }

        fn delete_table(&self, c: &Credentials, _: &str) -> SecurityResult<()> {
            self.check(c.user())
        }

        fn initialize_security(
            &self,
            c: &Credentials,
            _: &str,
            _: &[u8],
        ) -> Result<(), InitializeError> {
            Ok(self.check(c.user())?)
        }
    }

    fn creds() -> Credentials {
        Credentials::new("admin", b"pw".to_vec(), "inst")
    }

    fn succeeding() -> AuditedSecurityService<Fixed, MemoryAuditSink> {
        AuditedSecurityService::with_sink(
            Fixed {
                fail: None,
                self_only: false,
            },
            MemoryAuditSink::new(),
        )
    }

    fn failing(code: SecurityErrorCode) -> AuditedSecurityService<Fixed, MemoryAuditSink> {
        AuditedSecurityService::with_sink(
            Fixed {
                fail: Some(code),
                self_only: false,
            },
            MemoryAuditSink::new(),
        )
    }

    #[test]
    fn authenticate_mismatch_is_audited_as_failed_authentication() {
        let svc = succeeding();
        assert_eq!(svc.authenticate_user(&creds(), "bob", b"wrong"), Ok(false));
        assert_eq!(
            svc.sink().lines(),
            vec!["Using credentials admin: failed authentication"]
        );
        assert_eq!(svc.sink().records()[0].tier(), AuditTier::Audit);
    }

    #[test]
    fn authenticate_error_is_audited_with_operation_name() {
        let svc = failing(SecurityErrorCode::BadCredentials);
        let err = svc
            .authenticate_user(&creds(), "bob", b"right")
            .unwrap_err();

        assert_eq!(err, SecurityError::new("admin", SecurityErrorCode::BadCredentials));
        assert_eq!(
            svc.sink().lines(),
            vec!["Error: authenticated operation failed: admin: authenticateUser"]
        );
    }

    #[test]
    fn own_authorizations_audit_once_as_caller() {
        let svc = succeeding();
        let auths = svc.get_own_authorizations(&creds()).unwrap();

        assert_eq!(auths, Authorizations::from_labels(["a"]));
        assert_eq!(
            svc.sink().lines(),
            vec!["Using credentials admin: got authorizations for admin"]
        );
    }

    #[test]
    fn own_authorizations_use_backend_own_lookup() {
        let backend = Fixed {
            fail: None,
            self_only: true,
        };
        let direct = backend.get_own_authorizations(&creds());
        let svc = AuditedSecurityService::with_sink(backend, MemoryAuditSink::new());

        let audited = svc.get_own_authorizations(&creds());

        assert_eq!(audited, direct);
        assert_eq!(audited, Ok(Authorizations::from_labels(["mine"])));
        assert_eq!(
            svc.sink().lines(),
            vec!["Using credentials admin: got authorizations for admin"]
        );
        assert_eq!(
            svc.sink().records()[0].operation(),
            Operation::GetUserAuthorizations
        );
    }

    #[test]
    fn change_authorizations_success_names_new_set() {
        let svc = succeeding();
        let auths = Authorizations::from_labels(["x", "y"]);
        svc.change_authorizations(&creds(), "bob", &auths).unwrap();

        assert_eq!(
            svc.sink().lines(),
            vec!["Using credentials admin: changed authorizations for bob to x,y"]
        );
    }

    #[test]
    fn change_authorizations_failure_omits_set() {
        let svc = failing(SecurityErrorCode::PermissionDenied);
        let auths = Authorizations::from_labels(["x"]);
        svc.change_authorizations(&creds(), "bob", &auths).unwrap_err();

        let records = svc.sink().records();
        assert_eq!(records[0].arg(AuditField::Authorizations), None);
        assert_eq!(
            records[0].line(),
            "Error: authenticated operation failed: admin: changing authorizations for bob"
        );
    }

    #[test]
    fn create_and_drop_user_success_name_only_operation() {
        let svc = succeeding();
        svc.create_user(&creds(), "bob", b"pw", &Authorizations::new())
            .unwrap();
        svc.drop_user(&creds(), "bob").unwrap();

        assert_eq!(
            svc.sink().lines(),
            vec![
                "Using credentials admin: createUser".to_string(),
                "Using credentials admin: dropUser".to_string(),
            ]
        );
    }

    #[test]
    fn create_and_drop_user_failure_name_target() {
        let svc = failing(SecurityErrorCode::UserExists);
        svc.create_user(&creds(), "bob", b"pw", &Authorizations::new())
            .unwrap_err();
        svc.drop_user(&creds(), "carol").unwrap_err();

        assert_eq!(
            svc.sink().lines(),
            vec![
                "Error: authenticated operation failed: admin: createUser bob".to_string(),
                "Error: authenticated operation failed: admin: dropUser carol".to_string(),
            ]
        );
    }

    #[test]
    fn permission_messages_follow_templates() {
        let svc = succeeding();
        let c = creds();
        svc.grant_system_permission(&c, "bob", SystemPermission::CreateTable).unwrap();
        svc.revoke_system_permission(&c, "bob", SystemPermission::CreateTable).unwrap();
        svc.grant_table_permission(&c, "bob", "t1", TablePermission::Read).unwrap();
        svc.revoke_table_permission(&c, "bob", "t1", TablePermission::Read).unwrap();
        assert!(svc.has_system_permission(&c, "bob", SystemPermission::System).unwrap());
        assert!(!svc.has_table_permission(&c, "bob", "t1", TablePermission::Write).unwrap());

        let messages: Vec<String> = svc
            .sink()
            .records()
            .iter()
            .map(AuditRecord::message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "granted permission CREATE_TABLE for bob",
                "revoked permission CREATE_TABLE for bob",
                "granted permission READ on table t1 for bob",
                "revoked permission READ on table t1 for bob",
                "checked permission SYSTEM on bob",
                "checked permission WRITE on table t1 for bob",
            ]
        );
    }

    #[test]
    fn permission_failure_messages_follow_templates() {
        let svc = failing(SecurityErrorCode::PermissionDenied);
        let c = creds();
        let _ = svc.grant_system_permission(&c, "bob", SystemPermission::Grant);
        let _ = svc.revoke_system_permission(&c, "bob", SystemPermission::Grant);
        let _ = svc.grant_table_permission(&c, "bob", "t1", TablePermission::Write);
        let _ = svc.revoke_table_permission(&c, "bob", "t1", TablePermission::Write);
        let _ = svc.has_system_permission(&c, "bob", SystemPermission::Grant);
        let _ = svc.has_table_permission(&c, "bob", "t1", TablePermission::Write);

        let messages: Vec<String> = svc
            .sink()
            .records()
            .iter()
            .map(AuditRecord::message)
            .collect();
        assert_eq!(
            messages,
            vec![
                "granting permission GRANT for bob",
                "revoking permission GRANT on bob",
                "granting permission WRITE on table for t1",
                "revoking permission WRITE on table for t1",
                "checking permission GRANT on bob",
                "checking permission WRITE on bob",
            ]
        );
    }

    #[test]
    fn list_users_does_not_leak_result_set() {
        let svc = succeeding();
        let users = svc.list_users(&creds()).unwrap();

        assert_eq!(users.len(), 2);
        let records = svc.sink().records();
        assert!(records[0].args().is_empty());
        assert_eq!(records[0].line(), "Using credentials admin: listUsers");
    }

    #[test]
    fn delete_table_is_audited_both_ways() {
        let ok = succeeding();
        ok.delete_table(&creds(), "t9").unwrap();
        assert_eq!(ok.sink().records()[0].message(), "deleted table t9");

        let bad = failing(SecurityErrorCode::TableDoesntExist);
        bad.delete_table(&creds(), "t9").unwrap_err();
        let record = &bad.sink().records()[0];
        assert_eq!(record.message(), "deleting table t9");
        assert_eq!(
            record.outcome(),
            AuditOutcome::Failure {
                code: SecurityErrorCode::TableDoesntExist
            }
        );
    }

    #[test]
    fn initialize_success_emits_info_notice() {
        let svc = succeeding();
        svc.initialize_security(&creds(), "root", b"rootpw").unwrap();

        let records = svc.sink().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tier(), AuditTier::Info);
        assert_eq!(
            records[0].line(),
            "Initialized root user with username: root at the request of user admin"
        );
    }

    #[test]
    fn initialize_failure_is_not_audited() {
        let svc = failing(SecurityErrorCode::PermissionDenied);
        let err = svc
            .initialize_security(&creds(), "root", b"rootpw")
            .unwrap_err();

        assert_eq!(
            err,
            InitializeError::Security(SecurityError::new(
                "admin",
                SecurityErrorCode::PermissionDenied
            ))
        );
        assert!(svc.sink().is_empty());
    }

    #[test]
    fn into_parts_returns_wrapped_pieces() {
        let svc = succeeding();
        svc.list_users(&creds()).unwrap();
        let (inner, sink) = svc.into_parts();
        assert!(inner.fail.is_none());
        assert_eq!(sink.len(), 1);
    }
}
