use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::domain::models::{
    session::{LoginOutcome, SessionScope, SignupParams, SESSION_STORAGE_KEY},
    user::{NewUserParams, Role, User, UserStatus},
};
use crate::domain::ports::{Clock, KeyValueStore};
use crate::domain::services::attendance::attendance_for;
use crate::domain::services::credentials::CredentialStore;
use crate::domain::services::data_repository::DataRepository;
use crate::domain::services::identifier::{normalize_email, normalize_identifier};
use crate::domain::services::password_policy::is_strong_password;
use crate::domain::services::streak::apply_login_streak;
use crate::error::AppError;

const HOUSEHOLD_ID_SUFFIXES: i64 = 10_000;

#[derive(Default)]
struct SessionState {
    logged_in_user_id: Option<String>,
    scope: Option<SessionScope>,
    force_password_change: bool,
}

/// Which portal a login came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Portal {
    Household,
    Admin,
    Staff,
}

impl Portal {
    fn admits(self, role: Role) -> Result<(), AppError> {
        match self {
            Portal::Household => Ok(()),
            Portal::Admin if role == Role::Admin => Ok(()),
            Portal::Admin => Err(AppError::RoleMismatch("This account does not have admin access.".into())),
            Portal::Staff if role.is_staff() => Ok(()),
            Portal::Staff => Err(AppError::RoleMismatch("This account is not registered as staff.".into())),
        }
    }
}

/// Current-session identity and every flow that changes it.
///
/// Only the household id is held here; the user record itself always comes
/// from the repository.
pub struct AuthService {
    repo: DataRepository,
    credentials: CredentialStore,
    durable: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: Config,
    state: RwLock<SessionState>,
}

impl AuthService {
    pub fn new(
        repo: DataRepository,
        credentials: CredentialStore,
        durable: Arc<dyn KeyValueStore>,
        ephemeral: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        Self { repo, credentials, durable, ephemeral, clock, config, state: RwLock::new(SessionState::default()) }
    }

    fn scope_store(&self, scope: SessionScope) -> &Arc<dyn KeyValueStore> {
        match scope {
            SessionScope::Durable => &self.durable,
            SessionScope::Ephemeral => &self.ephemeral,
        }
    }

    /// Picks up a stored session, durable scope first. Ids that no longer
    /// resolve to a user are dropped from both scopes.
    pub async fn restore(&self) -> Result<Option<User>, AppError> {
        for scope in [SessionScope::Durable, SessionScope::Ephemeral] {
            let Some(household_id) = self.scope_store(scope).get(SESSION_STORAGE_KEY).await? else {
                continue;
            };

            match self.repo.find_user(&household_id).await {
                Some(user) => {
                    let mut state = self.state.write().await;
                    state.logged_in_user_id = Some(household_id);
                    state.scope = Some(scope);
                    info!("Restored {:?} session for {}", scope, user.household_id);
                    return Ok(Some(user));
                }
                None => {
                    warn!("Discarding stale session for {}", household_id);
                    self.clear_stored_session().await?;
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }

    pub async fn current_user(&self) -> Option<User> {
        let id = self.state.read().await.logged_in_user_id.clone()?;
        self.repo.find_user(&id).await
    }

    pub async fn logged_in_user_id(&self) -> Option<String> {
        self.state.read().await.logged_in_user_id.clone()
    }

    pub async fn force_password_change(&self) -> bool {
        self.state.read().await.force_password_change
    }

    pub async fn login(&self, identifier: &str, password: &str, remember_me: bool) -> Result<LoginOutcome, AppError> {
        self.authenticate(Portal::Household, identifier, password, remember_me).await
    }

    pub async fn login_as_admin(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, AppError> {
        self.authenticate(Portal::Admin, identifier, password, remember_me).await
    }

    /// Staff login also records attendance for the morning window.
    pub async fn login_as_staff(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, AppError> {
        self.authenticate(Portal::Staff, identifier, password, remember_me).await
    }

    async fn authenticate(
        &self,
        portal: Portal,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<LoginOutcome, AppError> {
        let identifier = normalize_identifier(identifier)?;
        let mut user = self
            .repo
            .find_user_by_identifier(&identifier)
            .await
            .ok_or_else(|| AppError::NotFound(identifier.clone()))?;

        if user.status == UserStatus::Blocked {
            return Err(AppError::Blocked);
        }
        if !self.credentials.verify(&identifier, password).await? {
            return Err(AppError::InvalidCredentials);
        }
        portal.admits(user.role)?;

        let now = self.clock.now();
        apply_login_streak(&mut user, now, self.config.timezone);
        user.last_login_time = Some(now);
        user.last_ip_address = Some(mock_client_ip());
        if portal == Portal::Staff {
            user.attendance_status = Some(attendance_for(
                now,
                self.config.timezone,
                self.config.attendance_window_start,
                self.config.attendance_window_minutes,
            ));
        }
        let user = self.repo.update_user(user).await?;

        let force_password_change = !is_strong_password(password);
        self.establish_session(&user.household_id, SessionScope::for_remember_me(remember_me), force_password_change)
            .await?;

        info!(household_id = %user.household_id, portal = ?portal, force_password_change, "Login succeeded");
        Ok(LoginOutcome { user, force_password_change })
    }

    pub async fn signup(&self, params: SignupParams) -> Result<LoginOutcome, AppError> {
        let name = params.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Please enter your name.".into()));
        }
        let identifier = normalize_identifier(&params.identifier)?;
        let email = params.email.as_deref().and_then(normalize_email);

        if self.repo.find_user_by_identifier(&identifier).await.is_some()
            || self.credentials.has_identifier(&identifier).await
        {
            return Err(AppError::DuplicateAccount(
                "An account with this mobile number or email already exists.".into(),
            ));
        }
        if let Some(email) = &email {
            let users = self.repo.users().await;
            let collides = users
                .iter()
                .any(|u| u.name.eq_ignore_ascii_case(&name) && u.email.as_deref() == Some(email.as_str()));
            if collides {
                return Err(AppError::DuplicateAccount("An account with this name and email already exists.".into()));
            }
        }
        if !is_strong_password(&params.password) {
            return Err(AppError::WeakPassword);
        }

        let now = self.clock.now();
        let family_size = params.family_size.max(1);
        let household_id = self.derive_household_id(&identifier, now.timestamp_millis()).await?;

        let mut user = User::new(
            NewUserParams {
                name,
                household_id,
                identifier: identifier.clone(),
                role: Role::Household,
                email,
                family_size,
                address: params.address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
                gram_panchayat: params.gram_panchayat,
                outstanding_balance: self.config.monthly_fee_for(family_size),
            },
            now,
        );
        user.login_streak = 1;
        user.last_streak_increment = Some(now);
        user.last_login_time = Some(now);
        user.last_ip_address = Some(mock_client_ip());

        let user = self.repo.add_user(user).await?;
        self.credentials.set_password(&identifier, &user.household_id, &params.password, now).await?;
        self.establish_session(&user.household_id, SessionScope::for_remember_me(params.remember_me), false)
            .await?;

        info!(household_id = %user.household_id, "Signup completed");
        Ok(LoginOutcome { user, force_password_change: false })
    }

    /// `HH-<stem>-<millis mod 10000>`, bumped until unused.
    async fn derive_household_id(&self, identifier: &str, millis: i64) -> Result<String, AppError> {
        let stem = household_id_stem(identifier);
        let taken: HashSet<String> = self.repo.users().await.into_iter().map(|u| u.household_id).collect();

        first_free_household_id(&stem, millis, |candidate| taken.contains(candidate)).ok_or_else(|| {
            error!(stem = %stem, "Every household id suffix is taken");
            AppError::Internal
        })
    }

    /// Switches the session to another account. Admin sessions only.
    pub async fn impersonate(&self, household_id: &str) -> Result<User, AppError> {
        let admin = self.require_user().await?;
        if admin.role != Role::Admin {
            return Err(AppError::Forbidden("Only administrators can switch accounts.".into()));
        }
        let target = self
            .repo
            .find_user(household_id)
            .await
            .ok_or_else(|| AppError::NotFound(household_id.to_string()))?;

        let scope = self.state.read().await.scope.unwrap_or(SessionScope::Ephemeral);
        self.establish_session(&target.household_id, scope, false).await?;

        info!(
            admin = %admin.household_id,
            target = %target.household_id,
            target_role = ?target.role,
            "Admin impersonation"
        );
        Ok(target)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), AppError> {
        let user = self.require_user().await?;
        if !self.credentials.verify(&user.identifier, current).await? {
            return Err(AppError::InvalidCredentials);
        }
        if !is_strong_password(new) {
            return Err(AppError::WeakPassword);
        }

        self.credentials.set_password(&user.identifier, &user.household_id, new, self.clock.now()).await?;
        self.state.write().await.force_password_change = false;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.clear_stored_session().await?;
        let mut state = self.state.write().await;
        if let Some(id) = state.logged_in_user_id.take() {
            info!("Logged out {}", id);
        }
        *state = SessionState::default();
        Ok(())
    }

    // --- Profile ---

    pub async fn update_user_name(&self, name: &str) -> Result<User, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty.".into()));
        }
        self.update_current(|user| user.name = name.to_string()).await
    }

    pub async fn update_user_email(&self, email: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        if let Some(e) = &email
            && !e.contains('@')
        {
            return Err(AppError::Validation("Please enter a valid email address.".into()));
        }
        self.update_current(|user| user.email = email).await
    }

    pub async fn update_user_profile_picture(&self, picture: Option<String>) -> Result<User, AppError> {
        self.update_current(|user| user.profile_picture = picture).await
    }

    pub async fn update_user_gram_panchayat(&self, gram_panchayat: &str) -> Result<User, AppError> {
        let value = gram_panchayat.trim();
        self.update_current(|user| {
            user.gram_panchayat = (!value.is_empty()).then(|| value.to_string());
        })
        .await
    }

    pub async fn toggle_booking_reminders(&self) -> Result<User, AppError> {
        self.update_current(|user| user.booking_reminders = !user.booking_reminders).await
    }

    async fn update_current<F>(&self, change: F) -> Result<User, AppError>
    where
        F: FnOnce(&mut User),
    {
        let mut user = self.require_user().await?;
        change(&mut user);
        self.repo.update_user(user).await
    }

    async fn require_user(&self) -> Result<User, AppError> {
        self.current_user().await.ok_or(AppError::Unauthorized)
    }

    async fn establish_session(
        &self,
        household_id: &str,
        scope: SessionScope,
        force_password_change: bool,
    ) -> Result<(), AppError> {
        self.clear_stored_session().await?;
        self.scope_store(scope).set(SESSION_STORAGE_KEY, household_id).await?;

        let mut state = self.state.write().await;
        state.logged_in_user_id = Some(household_id.to_string());
        state.scope = Some(scope);
        state.force_password_change = force_password_change;
        Ok(())
    }

    async fn clear_stored_session(&self) -> Result<(), AppError> {
        self.durable.remove(SESSION_STORAGE_KEY).await?;
        self.ephemeral.remove(SESSION_STORAGE_KEY).await
    }
}

/// Last four digits of a phone number, or the first four letters of an
/// email's local part.
fn household_id_stem(identifier: &str) -> String {
    let stem: String = match identifier.split_once('@') {
        Some((local, _)) => local.chars().filter(char::is_ascii_alphanumeric).take(4).collect(),
        None => {
            let digits: Vec<char> = identifier.chars().filter(char::is_ascii_digit).collect();
            digits[digits.len().saturating_sub(4)..].iter().collect()
        }
    };

    if stem.is_empty() { "USER".to_string() } else { stem.to_ascii_uppercase() }
}

/// Probes each of the 10,000 suffixes once, starting at `millis mod 10000`.
fn first_free_household_id(stem: &str, millis: i64, taken: impl Fn(&str) -> bool) -> Option<String> {
    let start = millis.rem_euclid(HOUSEHOLD_ID_SUFFIXES);
    (0..HOUSEHOLD_ID_SUFFIXES)
        .map(|offset| format!("HH-{}-{:04}", stem, (start + offset) % HOUSEHOLD_ID_SUFFIXES))
        .find(|candidate| !taken(candidate))
}

fn mock_client_ip() -> String {
    let mut rng = rand::thread_rng();
    format!("192.168.{}.{}", rng.gen_range(0..=255), rng.gen_range(1..=254))
}
