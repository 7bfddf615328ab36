use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use lostfound_types::api::Claims;
use lostfound_types::models::Caller;

use crate::error::ApiError;

/// Turns a bearer credential into a caller. Implemented by whatever issues
/// campus sessions; the board never mints credentials itself.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Result<Caller, ApiError>;
}

/// HS256 JWTs signed with a secret shared with the identity service.
pub struct JwtIdentity {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentity {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl IdentityResolver for JwtIdentity {
    fn resolve(&self, token: &str) -> Result<Caller, ApiError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))?;

        Ok(Caller {
            user_id: data.claims.sub,
            privileged: data.claims.admin,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use lostfound_types::api::Claims;
    use uuid::Uuid;

    pub const SECRET: &str = "test-secret";

    pub fn token_for(user_id: Uuid, admin: bool) -> String {
        token_with_expiry(user_id, admin, chrono::Duration::hours(1))
    }

    pub fn token_with_expiry(user_id: Uuid, admin: bool, ttl: chrono::Duration) -> String {
        let claims = Claims {
            sub: user_id,
            username: "tester".into(),
            admin,
            exp: (chrono::Utc::now() + ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use uuid::Uuid;

    #[test]
    fn resolves_subject_and_admin_flag() {
        let identity = JwtIdentity::new(SECRET);
        let user = Uuid::new_v4();

        let caller = identity.resolve(&token_for(user, false)).unwrap();
        assert_eq!(caller, Caller { user_id: user, privileged: false });

        let admin = identity.resolve(&token_for(user, true)).unwrap();
        assert!(admin.privileged);
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let identity = JwtIdentity::new("another-secret");
        let err = identity.resolve(&token_for(Uuid::new_v4(), false)).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let identity = JwtIdentity::new(SECRET);
        let expired = token_with_expiry(Uuid::new_v4(), false, chrono::Duration::hours(-2));
        assert!(matches!(identity.resolve(&expired), Err(ApiError::Unauthorized(_))));
        assert!(matches!(identity.resolve("garbage"), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn username_claim_is_optional() {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let user = Uuid::new_v4();
        let claims = serde_json::json!({
            "sub": user,
            "exp": (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
        });
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let caller = JwtIdentity::new(SECRET).resolve(&token).unwrap();
        assert_eq!(caller.user_id, user);
        assert!(!caller.privileged);
    }
}
