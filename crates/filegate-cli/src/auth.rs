//! Bearer token authentication

use crate::ApiError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Expiration time
    pub exp: i64,
    /// Calling user
    pub user_id: Option<String>,
    /// Role of the caller
    pub role: Option<String>,
    /// Originating system
    pub source: Option<String>,
    /// Caller e-mail
    pub email: Option<String>,
}

/// Validate a JWT token and extract claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp"]);

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Token validation failed: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn create_test_token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(exp: i64) -> Claims {
        Claims {
            exp,
            user_id: Some("user123".to_string()),
            role: Some("clerk".to_string()),
            source: Some("intake".to_string()),
            email: None,
        }
    }

    #[test]
    fn test_validate_token() {
        let secret = "test-secret";
        let token = create_test_token(&claims((Utc::now() + Duration::hours(1)).timestamp()), secret);

        let validated = validate_token(&token, secret).unwrap();

        assert_eq!(validated.user_id.as_deref(), Some("user123"));
        assert_eq!(validated.role.as_deref(), Some("clerk"));
    }

    #[test]
    fn test_expired_token() {
        let secret = "test-secret";
        let token = create_test_token(&claims((Utc::now() - Duration::hours(1)).timestamp()), secret);

        let result = validate_token(&token, secret);

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let token = create_test_token(
            &claims((Utc::now() + Duration::hours(1)).timestamp()),
            "test-secret",
        );
        assert!(validate_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_claims_use_camel_case() {
        let json = serde_json::to_value(claims(1)).unwrap();
        assert_eq!(json["userId"], "user123");
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic xyz"), None);
    }
}
