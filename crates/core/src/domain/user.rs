use serde::{Deserialize, Serialize};

use crate::errors::ApplicationError;

pub const DEFAULT_SIGNUP_ROLE: &str = "admin";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Site user. Passwords are stored and compared as entered; credential
/// hardening is out of scope for this service.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

impl User {
    pub fn verify_password(&self, candidate: &str) -> Result<(), ApplicationError> {
        if self.password != candidate {
            return Err(ApplicationError::Unauthorized("Wrong Password".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub phone_number: String,
    pub password: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::{User, UserId};
    use crate::errors::ApplicationError;

    fn user() -> User {
        User {
            id: UserId(1),
            name: "Ramesh Site".to_string(),
            phone_number: "9999999999".to_string(),
            password: "pass123".to_string(),
            role: "Site Engineer".to_string(),
        }
    }

    #[test]
    fn password_must_match_exactly() {
        user().verify_password("pass123").expect("matching password");
        let error = user().verify_password("PASS123").expect_err("case differs");
        assert_eq!(error, ApplicationError::Unauthorized("Wrong Password".to_string()));
    }

    #[test]
    fn password_never_appears_in_debug_or_json() {
        let debug = format!("{:?}", user());
        assert!(!debug.contains("pass123"));

        let json = serde_json::to_string(&user()).expect("serialize");
        assert!(!json.contains("pass123"));
    }
}
