use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{DatabaseResult, ModelManager, ResourceTyped};
use crate::web::{AuthenticatedUser, UserRole};

/// Public face of a user. Users that never edited their profile get defaults:
/// the username as display name, an empty bio and no skills.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Profile {
    user_id: Uuid,
    username: String,
    role: String,
    display_name: String,
    bio: String,
    avatar_url: Option<String>,
    skills: Vec<String>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProfileUpdate {
    /// Falls back to the username when omitted.
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl ResourceTyped for Profile {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Profile
    }
}

impl Profile {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> UserRole {
        UserRole::from(self.role.as_str())
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bio(&self) -> &str {
        &self.bio
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }
}

impl ProfileUpdate {
    pub const MAX_DISPLAY_NAME: usize = 100;
    pub const MAX_BIO: usize = 500;
    pub const MAX_SKILLS: usize = 20;

    /// Trims the fields and dedups skills, or says what is wrong with them.
    pub fn normalized(self) -> Result<Self, &'static str> {
        let display_name = match self.display_name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err("display name must not be empty");
                }
                if name.chars().count() > Self::MAX_DISPLAY_NAME {
                    return Err("display name is too long");
                }
                Some(name.to_string())
            }
            None => None,
        };

        let bio = self.bio.trim().to_string();
        if bio.chars().count() > Self::MAX_BIO {
            return Err("bio must be at most 500 characters");
        }

        let avatar_url = self
            .avatar_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let mut skills: Vec<String> = Vec::with_capacity(self.skills.len());
        for skill in self.skills {
            let skill = skill.trim();
            if !skill.is_empty() && !skills.iter().any(|s| s == skill) {
                skills.push(skill.to_string());
            }
        }
        if skills.len() > Self::MAX_SKILLS {
            return Err("too many skills");
        }

        Ok(Self {
            display_name,
            bio,
            avatar_url,
            skills,
        })
    }
}

impl Profile {
    pub async fn find(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT u.id AS user_id, u.username, u.role,
                   COALESCE(p.display_name, u.username) AS display_name,
                   COALESCE(p.bio, '') AS bio,
                   p.avatar_url,
                   COALESCE(p.skills, '{}') AS skills,
                   p.updated_at
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(mm.executor())
        .await?;

        Ok(result)
    }

    /// Replaces the actor's own profile. Expects a normalized update.
    pub async fn upsert(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: ProfileUpdate,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, bio, avatar_url, skills, updated_at)
            VALUES ($1, $2, $3, $4, $5, now())
            ON CONFLICT (user_id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                bio = EXCLUDED.bio,
                avatar_url = EXCLUDED.avatar_url,
                skills = EXCLUDED.skills,
                updated_at = now()
            "#,
        )
        .bind(actor.user_id())
        .bind(&data.display_name)
        .bind(&data.bio)
        .bind(&data.avatar_url)
        .bind(&data.skills)
        .execute(mm.executor())
        .await?;

        Ok(())
    }
}
