//! Member domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person taking part in a group
///
/// Identity is `id`. The name is display-only and may repeat within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Create a member with a freshly generated id
    pub fn with_name(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), name)
    }

    /// Validate member data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("member id cannot be empty");
        }
        if self.name.trim().is_empty() {
            return Err("member name cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_with_generated_id() {
        let a = Member::with_name("Asha");
        let b = Member::with_name("Asha");
        assert_eq!(a.name, b.name);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_member_validation() {
        assert!(Member::new("m1", "Ravi").validate().is_ok());
        assert!(Member::new("m1", "  ").validate().is_err());
        assert!(Member::new("", "Ravi").validate().is_err());
    }
}
