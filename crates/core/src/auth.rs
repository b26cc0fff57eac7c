use crate::domain::user::UserRecord;
use crate::error::Error;
use crate::storage::UserStore;
use std::sync::Arc;

/// bcrypt only reads the first 72 bytes of its input. Passwords are cropped
/// to this many characters before hashing and before verification, so two
/// passwords that agree on their first 72 characters are equivalent. This is
/// a known, deliberate constraint of the credential flow, not a defect to
/// repair; changing it would lock out existing accounts.
pub const MAX_BCRYPT_LENGTH: usize = 72;

pub fn truncate_password(password: &str) -> &str {
    match password.char_indices().nth(MAX_BCRYPT_LENGTH) {
        Some((idx, _)) => &password[..idx],
        None => password,
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthenticatedUser {
    pub name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, cost: u32) -> Self {
        Self { users, cost }
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<(), Error> {
        let safe_password = truncate_password(password);
        let password_hash = bcrypt::hash(safe_password, self.cost)
            .map_err(|e| Error::Storage(format!("Error hashing password: {e}")))?;

        let user = UserRecord {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        };

        let inserted = self
            .users
            .insert(&user)
            .await
            .map_err(|e| Error::storage("Error creating user", e))?;
        if !inserted {
            return Err(Error::DuplicateUser);
        }

        tracing::info!(email, "user signed up");
        Ok(())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, Error> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| Error::storage("Error looking up user", e))?
            .ok_or(Error::UserNotFound)?;

        // Same cropping as signup so the policy is symmetric.
        let safe_password = truncate_password(password);
        let matches = bcrypt::verify(safe_password, &user.password_hash)
            .map_err(|e| Error::Storage(format!("Error verifying password: {e}")))?;
        if !matches {
            return Err(Error::InvalidCredentials);
        }

        Ok(AuthenticatedUser {
            name: user.name,
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryUserStore;

    // Minimum bcrypt cost; keeps the hashing in these tests fast.
    const TEST_COST: u32 = 4;

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryUserStore::default()), TEST_COST)
    }

    #[test]
    fn truncation_keeps_72_chars_and_crops_the_73rd() {
        let exact: String = "a".repeat(72);
        assert_eq!(truncate_password(&exact), exact);

        let long: String = "a".repeat(73);
        assert_eq!(truncate_password(&long), exact);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long: String = "é".repeat(80);
        let cropped = truncate_password(&long);
        assert_eq!(cropped.chars().count(), 72);
        assert_eq!(cropped, "é".repeat(72));
    }

    #[tokio::test]
    async fn signup_then_login_returns_stored_name() {
        let auth = service();
        auth.signup("Alice", "a@x.com", "secret123").await.unwrap();

        let user = auth.login("a@x.com", "secret123").await.unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_signup_rejected_and_record_unchanged() {
        let auth = service();
        auth.signup("Alice", "a@x.com", "secret123").await.unwrap();

        let err = auth.signup("Mallory", "a@x.com", "hunter2").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateUser));

        // The original record still wins.
        let user = auth.login("a@x.com", "secret123").await.unwrap();
        assert_eq!(user.name, "Alice");
        assert!(matches!(
            auth.login("a@x.com", "hunter2").await.unwrap_err(),
            Error::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn login_unknown_email_is_user_not_found() {
        let auth = service();
        let err = auth.login("nobody@x.com", "whatever").await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound));
    }

    #[tokio::test]
    async fn login_wrong_password_is_invalid_credentials() {
        let auth = service();
        auth.signup("Alice", "a@x.com", "secret123").await.unwrap();

        let err = auth.login("a@x.com", "secret124").await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn passwords_differing_after_char_72_are_equivalent() {
        let auth = service();
        let prefix: String = "p".repeat(72);
        auth.signup("Alice", "a@x.com", &format!("{prefix}AAAA"))
            .await
            .unwrap();

        // Divergence starts at character 73, inside the cropped tail.
        let user = auth.login("a@x.com", &format!("{prefix}ZZZZ")).await.unwrap();
        assert_eq!(user.name, "Alice");
    }

    #[tokio::test]
    async fn passwords_differing_at_char_72_are_distinct() {
        let auth = service();
        let prefix: String = "p".repeat(71);
        auth.signup("Alice", "a@x.com", &format!("{prefix}Atail"))
            .await
            .unwrap();

        // Character 72 itself is still part of the hashed input.
        let err = auth
            .login("a@x.com", &format!("{prefix}Ztail"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }
}
