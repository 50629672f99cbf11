use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
};

/// Only the signed-in user may act on their own record.
pub fn require_self(claims: &Claims, user_id: &str) -> AppResult<()> {
    if claims.sub != user_id {
        return Err(AppError::Forbidden(
            "You can only modify your own profile".to_string(),
        ));
    }
    Ok(())
}

/// `action` completes "You are not authorized to ... this thread."
pub fn require_author(user_id: &str, author_id: &str, action: &str) -> AppResult<()> {
    if user_id != author_id {
        return Err(AppError::Forbidden(format!(
            "You are not authorized to {} this thread.",
            action
        )));
    }
    Ok(())
}
