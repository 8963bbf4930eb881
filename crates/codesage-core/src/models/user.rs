use serde::{Deserialize, Serialize};

use super::serde_ext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id", deserialize_with = "serde_ext::deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    /// Name to show in the navbar: username, falling back to email.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body returned by both `/auth/login` and `/auth/register`.
/// The token is optional on the wire so a missing token can be reported
/// as such instead of as a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response_with_mongo_id() {
        let json = r#"{"token":"abc.def.ghi","user":{"_id":"65f1","username":"ada","email":"ada@example.com"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.as_deref(), Some("abc.def.ghi"));
        let user = resp.user.unwrap();
        assert_eq!(user.id, "65f1");
        assert_eq!(user.display_name(), "ada");
    }

    #[test]
    fn test_parse_auth_response_numeric_id_no_token() {
        let json = r#"{"user":{"id":7,"email":"x@example.com"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(resp.token.is_none());
        let user = resp.user.unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.display_name(), "x@example.com");
    }
}
