//! Display data attached to join requests.

use knapsack_arena_core::{IdentityStore, StoreError, UserId};

/// Name and avatar shown to other room members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    /// Name shown to other members.
    pub display_name: String,
    /// Avatar reference.
    pub avatar: String,
}

/// Completes the display data of a joining player.
///
/// Values supplied by the client win; missing ones are looked up in the identity
/// store. Unknown accounts fall back to the user id and an empty avatar.
pub async fn resolve_profile(
    identity: &dyn IdentityStore,
    user_id: &UserId,
    display_name: Option<String>,
    avatar: Option<String>,
) -> Result<Profile, StoreError> {
    let display_name = display_name.filter(|name| !name.trim().is_empty());
    let avatar = avatar.filter(|avatar| !avatar.trim().is_empty());
    if let (Some(display_name), Some(avatar)) = (&display_name, &avatar) {
        return Ok(Profile {
            display_name: display_name.clone(),
            avatar: avatar.clone(),
        });
    }

    let account = identity.get_user_by_id(user_id).await?;
    let (stored_name, stored_avatar) = match account {
        Some(user) => (user.display_name, user.avatar),
        None => (user_id.to_string(), String::new()),
    };
    Ok(Profile {
        display_name: display_name.unwrap_or(stored_name),
        avatar: avatar.unwrap_or(stored_avatar),
    })
}
