use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::users::{
    dto::UserEntity,
    error::{UserError, UserResult},
    repo::UserStore,
    repo_types::{MatchParameter, MatchValue, NewUser, UserField, UserMatch},
};

/// Input of `UserService::create_user`.
#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Blank values are rejected; accepted values pass through untouched.
fn require(value: &str, what: &str) -> UserResult<()> {
    if value.trim().is_empty() {
        return Err(UserError::InvalidArgument(format!("{what} is required")));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    default_avatar_url: Arc<str>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, default_avatar_url: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            default_avatar_url: default_avatar_url.into(),
        }
    }

    #[instrument(name = "services.users.create_user", skip(self, input), fields(user_id = %input.id))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<String> {
        require(&input.id, "id")?;
        require(&input.username, "username")?;
        require(&input.email, "email")?;

        let avatar_url = input
            .avatar_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.default_avatar_url.to_string());
        let name = input.name.filter(|n| !n.trim().is_empty());

        let id = input.id;
        let user = NewUser {
            id: id.clone(),
            email: input.email,
            username: input.username,
            name,
            avatar_url,
        };

        match self.store.save_user(user).await {
            Ok(()) => {
                info!("user created");
                Ok(id)
            }
            Err(UserError::UserExists) => {
                warn!("user already exists");
                Err(UserError::UserExists)
            }
            Err(e) => {
                error!(error = %e, "failed to save user");
                Err(e)
            }
        }
    }

    #[instrument(name = "services.users.delete_user", skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        require(id, "id")?;
        info!("attempting to delete user");
        match self.store.remove_user(id).await {
            Ok(()) => {
                info!("user deleted");
                Ok(())
            }
            Err(UserError::UserNotFound) => {
                warn!("user to delete not found");
                Err(UserError::UserNotFound)
            }
            Err(e) => {
                error!(error = %e, "failed to delete user");
                Err(e)
            }
        }
    }

    /// Lookup by criteria with a caller-chosen projection.
    ///
    /// `parameter` and `fields` are checked against their allow-lists before
    /// the store is touched. Rows come back as entities carrying only the
    /// requested fields.
    #[instrument(name = "services.users.users", skip(self, fields, value))]
    pub async fn users(
        &self,
        fields: &[String],
        value: MatchValue,
        parameter: &str,
    ) -> UserResult<Vec<UserEntity>> {
        let parameter = MatchParameter::parse(parameter).map_err(|e| {
            warn!("invalid parameter");
            e
        })?;

        let fields = UserField::filter_allowed(fields);
        if fields.is_empty() {
            info!("no valid fields requested");
            return Err(UserError::InvalidFields);
        }

        let matcher = UserMatch::new(parameter, value)?;

        let rows = self.store.find_users(&fields, &matcher).await.map_err(|e| {
            error!(error = %e, "failed to get users");
            e
        })?;

        if rows.is_empty() {
            info!("no users matched");
            return Err(UserError::InvalidArgument("no users matched".into()));
        }

        let users: Vec<UserEntity> = rows.into_iter().map(UserEntity::from).collect();
        info!(count = users.len(), "users fetched");
        Ok(users)
    }

    /// Resolves an email to the account's id and username.
    #[instrument(name = "services.users.user_by_email", skip(self, email))]
    pub async fn user_by_email(&self, email: &str) -> UserResult<UserEntity> {
        require(email, "email")?;
        let creds = self.store.find_by_email(email).await.map_err(|e| {
            if !matches!(e, UserError::UserNotFound) {
                error!(error = %e, "failed to get user by email");
            }
            e
        })?;
        Ok(UserEntity {
            id: Some(creds.id),
            username: Some(creds.username),
            ..Default::default()
        })
    }
}
