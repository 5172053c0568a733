//! Cross-record uniqueness of usernames and phone numbers

use super::entity::UserId;
use super::repository::UserRepository;
use crate::domain::DomainError;

/// Check that no other active user holds the given username or phone.
///
/// `exclude` is the ID of the user being updated (`None` on create), so a
/// match against the user's own record is not a conflict. The username is
/// checked first and the first conflict found is returned.
pub async fn check_uniqueness<R>(
    repository: &R,
    username: Option<&str>,
    phone: Option<&str>,
    exclude: Option<UserId>,
) -> Result<(), DomainError>
where
    R: UserRepository + ?Sized,
{
    let is_other = |id: UserId| exclude != Some(id);

    if let Some(username) = username {
        if let Some(existing) = repository.find_by_username(username).await? {
            if is_other(existing.id()) {
                return Err(DomainError::username_exists(username));
            }
        }
    }

    if let Some(phone) = phone {
        if let Some(existing) = repository.find_by_phone(phone).await? {
            if is_other(existing.id()) {
                return Err(DomainError::phone_exists(phone));
            }
        }
    }

    Ok(())
}
