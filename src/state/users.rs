//! Back-office account management (admin only).

use std::sync::Arc;

use tracing::{info, warn};

use super::data::{Role, User};
use crate::api::{NewUser, UserApi};
use crate::error::{ApiError, ApiResult, EditError};

/// Fields of the "add user" form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl Default for NewUserForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role: Role::Manager,
        }
    }
}

impl NewUserForm {
    pub fn to_request(&self) -> Result<NewUser, EditError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(EditError::MissingEmail);
        }
        Ok(NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: email.to_string(),
            role: self.role,
        })
    }
}

/// What a role change means for the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessChange {
    None,
    Granted,
    Revoked,
}

/// Result of `change_role`
#[derive(Debug, Clone)]
pub enum RoleChange {
    Applied { user_id: i64, role: Role },
    /// The server refused; `users` is the reloaded list when that worked
    Rejected { error: ApiError, users: Option<Vec<User>> },
}

/// User table plus the identity of whoever is signed in
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
    current_user_id: Option<i64>,
    pub form: NewUserForm,
}

impl UserDirectory {
    pub fn new(current_user_id: Option<i64>) -> Self {
        Self { current_user_id, ..Self::default() }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    /// Show the newly selected role right away, as the role picker does
    pub fn select_role(&mut self, user_id: i64, role: Role) -> bool {
        match self.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) if user.role != role => {
                user.role = role;
                true
            }
            _ => false,
        }
    }

    /// The server accepted a role change
    pub fn role_applied(&self, user_id: i64, role: Role) -> AccessChange {
        if self.current_user_id != Some(user_id) {
            return AccessChange::None;
        }
        match role {
            Role::Admin => AccessChange::Granted,
            Role::Manager => AccessChange::Revoked,
        }
    }

    pub fn reset_form(&mut self) {
        self.form = NewUserForm::default();
    }
}

pub async fn load(api: Arc<dyn UserApi>) -> ApiResult<Vec<User>> {
    api.list_users().await
}

/// Create an account, then reload the list
pub async fn create(api: Arc<dyn UserApi>, user: NewUser) -> ApiResult<Vec<User>> {
    let created = api.create_user(&user).await?;
    info!(user_id = created.id, "user created");
    api.list_users().await
}

pub async fn change_role(api: Arc<dyn UserApi>, user_id: i64, role: Role) -> RoleChange {
    match api.set_role(user_id, role).await {
        Ok(()) => {
            info!(user_id, %role, "role changed");
            RoleChange::Applied { user_id, role }
        }
        Err(error) => {
            warn!(user_id, "role change refused: {error}");
            let users = match api.list_users().await {
                Ok(users) => Some(users),
                Err(e) => {
                    warn!("could not reload users: {e}");
                    None
                }
            };
            RoleChange::Rejected { error, users }
        }
    }
}

pub async fn reset_password(api: Arc<dyn UserApi>, user_id: i64) -> ApiResult<()> {
    api.reset_password(user_id).await?;
    info!(user_id, "password reset requested");
    Ok(())
}

pub async fn delete(api: Arc<dyn UserApi>, user_id: i64) -> ApiResult<Vec<User>> {
    api.delete_user(user_id).await?;
    info!(user_id, "user deleted");
    api.list_users().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeBackend};

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            email: format!("u{id}@catalog.test"),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_active: true,
        }
    }

    #[test]
    fn form_requires_email() {
        let mut form = NewUserForm::default();
        form.first_name = " Ana ".into();
        assert_eq!(form.to_request(), Err(EditError::MissingEmail));
        form.email = "ana@catalog.test ".into();
        let request = form.to_request().unwrap();
        assert_eq!(request.first_name, "Ana");
        assert_eq!(request.email, "ana@catalog.test");
        assert_eq!(request.role, Role::Manager);
    }

    #[test]
    fn demoting_yourself_revokes_access() {
        let mut dir = UserDirectory::new(Some(1));
        dir.set_users(vec![user(1, Role::Admin), user(2, Role::Admin)]);
        assert!(dir.select_role(1, Role::Manager));
        assert!(!dir.select_role(1, Role::Manager));
        assert_eq!(dir.role_applied(1, Role::Manager), AccessChange::Revoked);
        assert_eq!(dir.role_applied(2, Role::Manager), AccessChange::None);
        assert_eq!(dir.role_applied(1, Role::Admin), AccessChange::Granted);
    }

    #[tokio::test]
    async fn rejected_role_change_reloads_list() {
        let api = Arc::new(FakeBackend::new());
        api.set_users(vec![user(1, Role::Admin)]);
        api.fail_when(|call| matches!(call, Call::SetRole(..)));

        match change_role(api.clone(), 1, Role::Manager).await {
            RoleChange::Rejected { users: Some(users), .. } => {
                assert_eq!(users[0].role, Role::Admin);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn reload_failure_after_rejection_is_swallowed() {
        let api = Arc::new(FakeBackend::new());
        api.fail_when(|call| matches!(call, Call::SetRole(..) | Call::ListUsers));

        let outcome = change_role(api.clone(), 1, Role::Manager).await;
        assert!(matches!(outcome, RoleChange::Rejected { users: None, .. }));
    }

    #[tokio::test]
    async fn create_and_delete_return_fresh_list() {
        let api = Arc::new(FakeBackend::new());
        let form = NewUserForm { email: "new@catalog.test".into(), ..NewUserForm::default() };

        let users = create(api.clone(), form.to_request().unwrap()).await.unwrap();
        assert_eq!(users.len(), 1);
        let id = users[0].id;

        let users = delete(api.clone(), id).await.unwrap();
        assert!(users.is_empty());
        assert_eq!(
            api.writes(),
            vec![Call::CreateUser("new@catalog.test".into()), Call::DeleteUser(id)]
        );
    }
}
