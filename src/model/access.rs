use crate::{
    model::{
        ModelManager,
        error::{DatabaseError, DatabaseResult},
    },
    web::{AuthenticatedUser, UserRole},
};

/// Resources that belong to exactly one user (a learner or an instructor).
#[async_trait::async_trait]
pub trait HasOwner {
    type OwnerId: PartialEq + Send + Sync;
    async fn get_owner_id(
        &self,
        mm: &ModelManager,
        ctx: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId>;
}

pub async fn check_access<T, O>(
    mm: &ModelManager,
    ctx: &AuthenticatedUser,
    resource: &T,
    expected: O,
) -> DatabaseResult<()>
where
    T: HasOwner<OwnerId = O> + Sync,
    O: PartialEq + Send + Sync,
{
    // admin can get all resources, no need to resolve the owner
    if ctx.user_role() == UserRole::Admin {
        return Ok(());
    }

    let actual_owner = resource.get_owner_id(mm, ctx).await?;
    if actual_owner == expected {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}
