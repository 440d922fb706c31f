//! Audited security service demonstration.
//!
//! This example wires an in-memory security backend behind the audit
//! decorator and walks through a short administrative session:
//! 1. Build the shared instance from a TOML config
//! 2. Initialize security and create a user
//! 3. Grant, check and revoke permissions
//! 4. Trigger a denied operation and show the error passes through
//!
//! Audit lines are printed by the `tracing` subscriber on the `audit` target.
//!
//! Run with: `cargo run --example audited_service`

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

use audited_security::{
    AuditedSecurityService, Authorizations, Credentials, InitializeError, SecurityConfig,
    SecurityError, SecurityErrorCode, SecurityInstance, SecurityResult, SecurityService,
    SystemPermission, TablePermission,
};
use parking_lot::Mutex;

static SECURITY: SecurityInstance<AuditedSecurityService<InMemorySecurity>> =
    SecurityInstance::new();

#[derive(Default)]
struct UserEntry {
    password: Vec<u8>,
    authorizations: Authorizations,
    system: BTreeSet<SystemPermission>,
    tables: BTreeSet<(String, TablePermission)>,
}

/// Toy backend: the root user may do anything, everyone else needs grants.
struct InMemorySecurity {
    instance_id: String,
    users: Mutex<BTreeMap<String, UserEntry>>,
}

impl InMemorySecurity {
    fn new(instance_id: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            users: Mutex::new(BTreeMap::new()),
        }
    }

    fn check(&self, credentials: &Credentials, needed: SystemPermission) -> SecurityResult<()> {
        let denied = |code| SecurityError::new(credentials.user(), code);
        if credentials.instance_id() != self.instance_id {
            return Err(denied(SecurityErrorCode::InvalidInstanceId));
        }
        let users = self.users.lock();
        let entry = users
            .get(credentials.user())
            .ok_or_else(|| denied(SecurityErrorCode::BadCredentials))?;
        if entry.password != credentials.token().expose_secret().as_slice() {
            return Err(denied(SecurityErrorCode::BadCredentials));
        }
        if entry.system.contains(&SystemPermission::System) || entry.system.contains(&needed) {
            Ok(())
        } else {
            Err(denied(SecurityErrorCode::PermissionDenied)
                .with_message(format!("{needed} required")))
        }
    }

    fn with_user<T>(
        &self,
        credentials: &Credentials,
        user: &str,
        f: impl FnOnce(&mut UserEntry) -> T,
    ) -> SecurityResult<T> {
        self.users
            .lock()
            .get_mut(user)
            .map(f)
            .ok_or_else(|| {
                SecurityError::new(credentials.user(), SecurityErrorCode::UserDoesntExist)
            })
    }
}

impl SecurityService for InMemorySecurity {
    fn authenticate_user(
        &self,
        _: &Credentials,
        user: &str,
        password: &[u8],
    ) -> SecurityResult<bool> {
        Ok(self
            .users
            .lock()
            .get(user)
            .is_some_and(|entry| entry.password == password))
    }

    fn get_user_authorizations(
        &self,
        credentials: &Credentials,
        user: &str,
    ) -> SecurityResult<Authorizations> {
        if user != credentials.user() {
            self.check(credentials, SystemPermission::AlterUser)?;
        }
        self.with_user(credentials, user, |entry| entry.authorizations.clone())
    }

    fn change_authorizations(
        &self,
        credentials: &Credentials,
        user: &str,
        authorizations: &Authorizations,
    ) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::AlterUser)?;
        self.with_user(credentials, user, |entry| {
            entry.authorizations = authorizations.clone();
        })
    }

    fn change_password(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
    ) -> SecurityResult<()> {
        if user != credentials.user() {
            self.check(credentials, SystemPermission::AlterUser)?;
        }
        self.with_user(credentials, user, |entry| entry.password = password.to_vec())
    }

    fn create_user(
        &self,
        credentials: &Credentials,
        user: &str,
        password: &[u8],
        authorizations: &Authorizations,
    ) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::CreateUser)?;
        let mut users = self.users.lock();
        if users.contains_key(user) {
            return Err(SecurityError::new(credentials.user(), SecurityErrorCode::UserExists));
        }
        users.insert(
            user.to_string(),
            UserEntry {
                password: password.to_vec(),
                authorizations: authorizations.clone(),
                ..UserEntry::default()
            },
        );
        Ok(())
    }

    fn drop_user(&self, credentials: &Credentials, user: &str) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::DropUser)?;
        self.users
            .lock()
            .remove(user)
            .map(|_| ())
            .ok_or_else(|| {
                SecurityError::new(credentials.user(), SecurityErrorCode::UserDoesntExist)
            })
    }

    fn grant_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::Grant)?;
        self.with_user(credentials, user, |entry| {
            entry.system.insert(permission);
        })
    }

    fn grant_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::Grant)?;
        self.with_user(credentials, user, |entry| {
            entry.tables.insert((table.to_string(), permission));
        })
    }

    fn revoke_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::Grant)?;
        self.with_user(credentials, user, |entry| {
            entry.system.remove(&permission);
        })
    }

    fn revoke_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::Grant)?;
        self.with_user(credentials, user, |entry| {
            entry.tables.remove(&(table.to_string(), permission));
        })
    }

    fn has_system_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        permission: SystemPermission,
    ) -> SecurityResult<bool> {
        self.with_user(credentials, user, |entry| entry.system.contains(&permission))
    }

    fn has_table_permission(
        &self,
        credentials: &Credentials,
        user: &str,
        table: &str,
        permission: TablePermission,
    ) -> SecurityResult<bool> {
        self.with_user(credentials, user, |entry| {
            entry.tables.contains(&(table.to_string(), permission))
        })
    }

    fn list_users(&self, credentials: &Credentials) -> SecurityResult<BTreeSet<String>> {
        self.check(credentials, SystemPermission::CreateUser)?;
        Ok(self.users.lock().keys().cloned().collect())
    }

    fn delete_table(&self, credentials: &Credentials, table: &str) -> SecurityResult<()> {
        self.check(credentials, SystemPermission::DropTable)?;
        for entry in self.users.lock().values_mut() {
            entry.tables.retain(|(name, _)| name != table);
        }
        Ok(())
    }

    fn initialize_security(
        &self,
        credentials: &Credentials,
        root_user: &str,
        root_password: &[u8],
    ) -> Result<(), InitializeError> {
        let mut users = self.users.lock();
        if !users.is_empty() {
            return Err(InitializeError::Bootstrap {
                message: format!("instance {} already initialized", self.instance_id),
            });
        }
        if credentials.instance_id() != self.instance_id {
            return Err(
                SecurityError::new(credentials.user(), SecurityErrorCode::InvalidInstanceId).into(),
            );
        }
        users.insert(
            root_user.to_string(),
            UserEntry {
                password: root_password.to_vec(),
                system: BTreeSet::from([SystemPermission::System]),
                ..UserEntry::default()
            },
        );
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(true).init();

    println!("=== Audited Security Service Example ===\n");

    let config = match SecurityConfig::from_toml_str(
        r#"
        instance_id = "demo-instance"
        root_user = "root"
        "#,
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            return;
        }
    };

    let security = SECURITY
        .get_or_try_init(|| {
            Ok::<_, Infallible>(AuditedSecurityService::new(InMemorySecurity::new(
                &config.instance_id,
            )))
        })
        .unwrap_or_else(|never| match never {});

    // Scenario 1: Bootstrap
    println!("--- Scenario 1: Bootstrap ---");
    let system = config.credentials("system", b"".to_vec());
    if let Err(e) = security.initialize_security(&system, &config.root_user, b"rootpw") {
        eprintln!("Initialization failed: {}", e);
        return;
    }
    let again = security.initialize_security(&system, &config.root_user, b"rootpw");
    println!("Second initialization rejected: {}", again.is_err());

    // Scenario 2: User lifecycle
    println!("\n--- Scenario 2: User Lifecycle ---");
    let root = config.credentials(config.root_user.clone(), b"rootpw".to_vec());
    let auths = Authorizations::from_labels(["public", "finance"]);
    match security.create_user(&root, "alice", b"alicepw", &auths) {
        Ok(()) => println!("Created alice"),
        Err(e) => eprintln!("Create failed: {}", e),
    }
    let alice = config.credentials("alice", b"alicepw".to_vec());
    println!(
        "alice authenticates: {:?}",
        security.authenticate_user(&root, "alice", b"alicepw")
    );
    println!("alice sees: {:?}", security.get_own_authorizations(&alice));

    // Scenario 3: Permissions
    println!("\n--- Scenario 3: Permissions ---");
    let _ = security.grant_table_permission(&root, "alice", "orders", TablePermission::Read);
    println!(
        "alice may read orders: {:?}",
        security.has_table_permission(&root, "alice", "orders", TablePermission::Read)
    );
    let _ = security.revoke_table_permission(&root, "alice", "orders", TablePermission::Read);

    // Scenario 4: Denied operation
    println!("\n--- Scenario 4: Denied Operation ---");
    match security.grant_system_permission(&alice, "alice", SystemPermission::System) {
        Ok(()) => println!("Unexpectedly granted"),
        Err(e) => println!("Caller sees the backend error unchanged: {}", e),
    }

    println!("\nUsers: {:?}", security.list_users(&root));
    println!("\n=== Example Complete ===");
}
