use serde::Serialize;

use crate::model::entity::UserNotification;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InboxResponse {
    /// Newest first.
    pub items: Vec<UserNotification>,
    /// Counted over the whole inbox, not only `items`.
    pub unread: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MarkedReadResponse {
    pub updated: u64,
}
