//! Login stub. Not a security boundary: the admin credential is hardcoded and
//! student passwords live in cleartext on the roster.

use thiserror::Error;

use crate::model::{normalize_name, CurrentUser, Role, Student};

const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";
/// Students without a stored password log in with this.
pub const DEFAULT_STUDENT_PASSWORD: &str = "student123";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
}

pub fn login(
    roster: &[Student],
    username: &str,
    password: &str,
) -> Result<CurrentUser, AuthError> {
    if username.trim().eq_ignore_ascii_case(ADMIN_USERNAME) && password == ADMIN_PASSWORD {
        return Ok(CurrentUser {
            id: None,
            name: "Admin".to_string(),
            role: Role::Admin,
        });
    }

    let key = normalize_name(username);
    if let Some(student) = roster.iter().find(|s| s.normalized_name() == key) {
        let expected = student
            .password
            .as_deref()
            .unwrap_or(DEFAULT_STUDENT_PASSWORD);
        if password == expected {
            return Ok(CurrentUser {
                id: Some(student.id.clone()),
                name: student.name.clone(),
                role: Role::Client,
            });
        }
    }

    Err(AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Goal;

    fn student(name: &str, password: Option<&str>) -> Student {
        Student {
            id: format!("id-{name}"),
            name: name.to_string(),
            password: password.map(str::to_string),
            age: None,
            height_cm: None,
            sex: None,
            goal: Goal::GeneralHealth,
            activity_level: None,
            health_conditions: None,
            medical_restrictions: None,
            supplements: None,
            assessments: Vec::new(),
        }
    }

    #[test]
    fn admin_credential_is_hardcoded() {
        let user = login(&[], "Admin", "admin123").unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(user.id.is_none());
        assert!(login(&[], "admin", "wrong").is_err());
    }

    #[test]
    fn student_logs_in_with_stored_password() {
        let roster = vec![student("Ana Silva", Some("segredo"))];
        let user = login(&roster, "  ANA SILVA ", "segredo").unwrap();
        assert_eq!(user.role, Role::Client);
        assert_eq!(user.id.as_deref(), Some("id-Ana Silva"));
        assert!(login(&roster, "Ana Silva", DEFAULT_STUDENT_PASSWORD).is_err());
    }

    #[test]
    fn unset_password_falls_back_to_the_default() {
        let roster = vec![student("Bruno", None)];
        assert!(login(&roster, "bruno", DEFAULT_STUDENT_PASSWORD).is_ok());
        assert!(login(&roster, "bruno", "other").is_err());
    }
}
