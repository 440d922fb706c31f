//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use audited_security::audit::Operation;
use audited_security::{
    Authorizations, Credentials, InitializeError, SecurityError, SecurityResult, SecurityService,
    SystemPermission, TablePermission,
};

enum Mode {
    Succeed,
    Fail(SecurityError),
    FailBootstrap(String),
}

/// Backend that answers every call with canned values or a scripted error.
pub struct FakeSecurityService {
    mode: Mode,
    calls: AtomicUsize,
}

impl FakeSecurityService {
    pub fn succeeding() -> Self {
        Self::with_mode(Mode::Succeed)
    }

    pub fn failing(err: SecurityError) -> Self {
        Self::with_mode(Mode::Fail(err))
    }

    /// Every operation succeeds except initialization, which fails before
    /// the security layer is reached.
    pub fn failing_bootstrap(message: &str) -> Self {
        Self::with_mode(Mode::FailBootstrap(message.to_string()))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls that reached this backend.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond<T>(&self, value: T) -> SecurityResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            Mode::Fail(err) => Err(err.clone()),
            Mode::Succeed | Mode::FailBootstrap(_) => Ok(value),
        }
    }
}

pub fn canned_authorizations() -> Authorizations {
    Authorizations::from_labels(["public", "secret"])
}

pub fn canned_users() -> BTreeSet<String> {
    ["alice", "bob", "carol"].into_iter().map(String::from).collect()
}

impl SecurityService for FakeSecurityService {
    fn authenticate_user(
        &self,
        _: &Credentials,
        _: &str,
        password: &[u8],
    ) -> SecurityResult<bool> {
        self.respond(!password.is_empty())
    }

    fn get_user_authorizations(&self, _: &Credentials, _: &str) -> SecurityResult<Authorizations> {
        self.respond(canned_authorizations())
    }

    fn change_authorizations(
        &self,
        _: &Credentials,
        _: &str,
        _: &Authorizations,
    ) -> SecurityResult<()> {
        self.respond(())
    }

    fn change_password(&self, _: &Credentials, _: &str, _: &[u8]) -> SecurityResult<()> {
        self.respond(())
    }

    fn create_user(
        &self,
        _: &Credentials,
        _: &str,
        _: &[u8],
        _: &Authorizations,
    ) -> SecurityResult<()> {
        self.respond(())
    }

    fn drop_user(&self, _: &Credentials, _: &str) -> SecurityResult<()> {
        self.respond(())
    }

    fn grant_system_permission(
        &self,
        _: &Credentials,
        _: &str,
        _: SystemPermission,
    ) -> SecurityResult<()> {
        self.respond(())
    }

    fn grant_table_permission(
        &self,
        _: &Credentials,
        _: &str,
        _: &str,
        _: TablePermission,
    ) -> SecurityResult<()> {
        self.respond(())
    }

    fn revoke_system_permission(
        &self,
        _: &Credentials,
        _: &str,
        _: SystemPermission,
    ) -> SecurityResult<()> {
        self.respond(())
    }

    fn revoke_table_permission(
        &self,
        _: &Credentials,
        _: &str,
        _: &str,
        _: TablePermission,
    ) -> SecurityResult<()> {
        self.respond(())
    }

    fn has_system_permission(
        &self,
        _: &Credentials,
        _: &str,
        _: SystemPermission,
    ) -> SecurityResult<bool> {
        self.respond(true)
    }

    fn has_table_permission(
        &self,
        _: &Credentials,
        _: &str,
        _: &str,
        _: TablePermission,
    ) -> SecurityResult<bool> {
        self.respond(false)
    }

    fn list_users(&self, _: &Credentials) -> SecurityResult<BTreeSet<String>> {
        self.respond(canned_users())
    }

    fn delete_table(&self, _: &Credentials, _: &str) -> SecurityResult<()> {
        self.respond(())
    }

    fn initialize_security(
        &self,
        _: &Credentials,
        _: &str,
        _: &[u8],
    ) -> Result<(), InitializeError> {
        if let Mode::FailBootstrap(message) = &self.mode {
            self.calls.fetch_add(1, Ordering::SeqCst);
            return Err(InitializeError::Bootstrap {
                message: message.clone(),
            });
        }
        Ok(self.respond(())?)
    }
}

pub fn creds(user: &str) -> Credentials {
    Credentials::new(user, b"token".to_vec(), "test-instance")
}

/// One call of an audited operation, with its result rendered for comparison.
pub type Call = fn(&dyn SecurityService, &Credentials) -> SecurityResult<String>;

fn entry(operation: Operation, call: Call) -> (Operation, Call) {
    (operation, call)
}

/// Every operation covered by the audit contract, called with fixed arguments.
pub fn audited_calls() -> Vec<(Operation, Call)> {
    vec![
        entry(Operation::AuthenticateUser, |s, c| {
            s.authenticate_user(c, "alice", b"pw").map(|v| format!("{v:?}"))
        }),
        entry(Operation::GetUserAuthorizations, |s, c| {
            s.get_user_authorizations(c, "alice").map(|v| format!("{v:?}"))
        }),
        entry(Operation::ChangeAuthorizations, |s, c| {
            s.change_authorizations(c, "alice", &canned_authorizations())
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::ChangePassword, |s, c| {
            s.change_password(c, "alice", b"new").map(|v| format!("{v:?}"))
        }),
        entry(Operation::CreateUser, |s, c| {
            s.create_user(c, "dave", b"pw", &Authorizations::new())
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::DropUser, |s, c| {
            s.drop_user(c, "dave").map(|v| format!("{v:?}"))
        }),
        entry(Operation::GrantSystemPermission, |s, c| {
            s.grant_system_permission(c, "bob", SystemPermission::CreateTable)
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::GrantTablePermission, |s, c| {
            s.grant_table_permission(c, "bob", "table1", TablePermission::Write)
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::RevokeSystemPermission, |s, c| {
            s.revoke_system_permission(c, "bob", SystemPermission::CreateTable)
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::RevokeTablePermission, |s, c| {
            s.revoke_table_permission(c, "bob", "table1", TablePermission::Write)
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::HasSystemPermission, |s, c| {
            s.has_system_permission(c, "bob", SystemPermission::System)
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::HasTablePermission, |s, c| {
            s.has_table_permission(c, "bob", "table1", TablePermission::Read)
                .map(|v| format!("{v:?}"))
        }),
        entry(Operation::ListUsers, |s, c| {
            s.list_users(c).map(|v| format!("{v:?}"))
        }),
        entry(Operation::DeleteTable, |s, c| {
            s.delete_table(c, "table1").map(|v| format!("{v:?}"))
        }),
    ]
}

/// Rendered success and failure messages for each entry of [`audited_calls`],
/// in the same order.
pub fn expected_messages() -> Vec<(Operation, &'static str, &'static str)> {
    vec![
        (Operation::AuthenticateUser, "authenticated", "authenticateUser"),
        (
            Operation::GetUserAuthorizations,
            "got authorizations for alice",
            "getting authorizations for alice",
        ),
        (
            Operation::ChangeAuthorizations,
            "changed authorizations for alice to public,secret",
            "changing authorizations for alice",
        ),
        (
            Operation::ChangePassword,
            "changed password for alice",
            "changing password for alice",
        ),
        (Operation::CreateUser, "createUser", "createUser dave"),
        (Operation::DropUser, "dropUser", "dropUser dave"),
        (
            Operation::GrantSystemPermission,
            "granted permission CREATE_TABLE for bob",
            "granting permission CREATE_TABLE for bob",
        ),
        (
            Operation::GrantTablePermission,
            "granted permission WRITE on table table1 for bob",
            "granting permission WRITE on table for table1",
        ),
        (
            Operation::RevokeSystemPermission,
            "revoked permission CREATE_TABLE for bob",
            "revoking permission CREATE_TABLE on bob",
        ),
        (
            Operation::RevokeTablePermission,
            "revoked permission WRITE on table table1 for bob",
            "revoking permission WRITE on table for table1",
        ),
        (
            Operation::HasSystemPermission,
            "checked permission SYSTEM on bob",
            "checking permission SYSTEM on bob",
        ),
        (
            Operation::HasTablePermission,
            "checked permission READ on table table1 for bob",
            "checking permission READ on bob",
        ),
        (Operation::ListUsers, "listUsers", "listUsers"),
        (Operation::DeleteTable, "deleted table table1", "deleting table table1"),
    ]
}
