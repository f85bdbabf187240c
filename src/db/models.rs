use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored credential. Not `Serialize`: the hash must never leave the service.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

impl UserRecord {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// Insert request handed to a credential store; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Outward-facing user view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_has_no_secret_fields() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        };

        let json = serde_json::to_value(record.to_public()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["email"], "a@x.com");
        assert_eq!(obj["id"], record.id.to_string());
        assert!(!json.to_string().contains("argon2"));
    }
}
