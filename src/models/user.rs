use serde::{Deserialize, Serialize};

/// Role the backend assigns to an account.
/// Admins manage job postings; users apply to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Public,
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub contact_number: String,
    pub user_type: UserType,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

/// Token pair issued by `POST /api/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginTokens {
    pub access: String,
    pub refresh: String,
    pub user_type: UserType,
}

/// Registration payload for `POST /api/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub password: String,
}

/// Editable profile fields for `PUT /api/me/update/`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"refresh":"R1","access":"A1","user_type":"ADMIN"}"#;
        let tokens: LoginTokens = serde_json::from_str(json).expect("Failed to parse login response");
        assert_eq!(tokens.access, "A1");
        assert_eq!(tokens.refresh, "R1");
        assert_eq!(tokens.user_type, UserType::Admin);
    }

    #[test]
    fn test_parse_profile() {
        let json = r#"{"email":"a@b.com","first_name":"Ada","last_name":"Lovelace","contact_number":"555-0100","user_type":"USER"}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("Failed to parse profile");
        assert_eq!(profile.full_name(), "Ada Lovelace");
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_full_name_falls_back_to_email() {
        let json = r#"{"email":"a@b.com","user_type":"USER"}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("Failed to parse profile");
        assert_eq!(profile.full_name(), "a@b.com");
    }
}
