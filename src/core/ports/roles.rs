use crate::error::Error;

pub trait Roles {
    /// Unknown users are not admins.
    async fn is_admin(&self, user_id: i32) -> Result<bool, Error>;
}
