//! User domain events.

use common::StreamId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on a user aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    /// User was created.
    UserCreated(UserCreatedData),

    /// User was renamed.
    UserNameUpdated(UserNameUpdatedData),
}

impl DomainEvent for UserEvent {
    const EVENT_TYPES: &'static [&'static str] = &["UserCreated", "UserNameUpdated"];

    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::UserCreated(_) => "UserCreated",
            UserEvent::UserNameUpdated(_) => "UserNameUpdated",
        }
    }
}

/// Data for UserCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedData {
    pub user_id: StreamId,
    pub user_name: String,
}

/// Data for UserNameUpdated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNameUpdatedData {
    pub user_id: StreamId,
    pub user_name: String,
}

impl UserEvent {
    /// Creates a UserCreated event.
    pub fn user_created(user_id: StreamId, user_name: impl Into<String>) -> Self {
        UserEvent::UserCreated(UserCreatedData {
            user_id,
            user_name: user_name.into(),
        })
    }

    /// Creates a UserNameUpdated event.
    pub fn user_name_updated(user_id: StreamId, user_name: impl Into<String>) -> Self {
        UserEvent::UserNameUpdated(UserNameUpdatedData {
            user_id,
            user_name: user_name.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_cover_every_variant() {
        let id = StreamId::new();
        for event in [
            UserEvent::user_created(id, "John Doe"),
            UserEvent::user_name_updated(id, "Adam Smith"),
        ] {
            assert!(UserEvent::is_known(event.event_type()));
        }
    }

    #[test]
    fn serializes_adjacently_tagged() {
        let id = StreamId::new();
        let json = serde_json::to_value(UserEvent::user_created(id, "John Doe")).unwrap();

        assert_eq!(json["type"], "UserCreated");
        assert_eq!(json["data"]["user_name"], "John Doe");
        assert_eq!(json["data"]["user_id"], id.to_string());
    }
}
