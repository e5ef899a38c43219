//! User aggregate implementation.

use common::StreamId;
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{UserError, UserEvent};

/// User aggregate root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    id: Option<StreamId>,
    name: String,
    version: Version,
}

impl Aggregate for User {
    type Event = UserEvent;
    type Error = UserError;

    fn aggregate_type() -> &'static str {
        "User"
    }

    fn id(&self) -> Option<StreamId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            UserEvent::UserCreated(data) => {
                self.id = Some(data.user_id);
                self.name = data.user_name;
            }
            UserEvent::UserNameUpdated(data) => {
                self.name = data.user_name;
            }
        }
    }
}

// Query methods
impl User {
    /// Returns the user's current name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

// Command methods (return events)
impl User {
    /// Creates the user.
    pub fn create(&self, user_id: StreamId, name: &str) -> Result<Vec<UserEvent>, UserError> {
        if self.id.is_some() {
            return Err(UserError::AlreadyCreated);
        }

        let name = validate_name(name)?;
        Ok(vec![UserEvent::user_created(user_id, name)])
    }

    /// Renames the user. Renaming to the current name records nothing.
    pub fn update_name(&self, name: &str) -> Result<Vec<UserEvent>, UserError> {
        let Some(user_id) = self.id else {
            return Err(UserError::NotCreated);
        };

        let name = validate_name(name)?;
        if name == self.name {
            return Ok(vec![]);
        }

        Ok(vec![UserEvent::user_name_updated(user_id, name)])
    }
}

fn validate_name(name: &str) -> Result<&str, UserError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(UserError::NameRequired);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created() -> (User, StreamId) {
        let id = StreamId::new();
        let mut user = User::default();
        let events = user.create(id, "John Doe").unwrap();
        user.apply_events(events);
        (user, id)
    }

    #[test]
    fn test_create_user() {
        let (user, id) = created();
        assert_eq!(user.id(), Some(id));
        assert_eq!(user.name(), "John Doe");
        assert_eq!(user.version(), Version::first());
    }

    #[test]
    fn test_create_twice_fails() {
        let (user, _) = created();
        assert!(matches!(
            user.create(StreamId::new(), "Jane Doe"),
            Err(UserError::AlreadyCreated)
        ));
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let user = User::default();
        assert!(matches!(
            user.create(StreamId::new(), "   "),
            Err(UserError::NameRequired)
        ));

        let (user, _) = created();
        assert!(matches!(user.update_name(""), Err(UserError::NameRequired)));
    }

    #[test]
    fn test_names_are_trimmed() {
        let events = User::default()
            .create(StreamId::new(), "  John Doe ")
            .unwrap();
        assert!(matches!(
            &events[0],
            UserEvent::UserCreated(data) if data.user_name == "John Doe"
        ));
    }

    #[test]
    fn test_update_name() {
        let (mut user, id) = created();
        let events = user.update_name("Adam Smith").unwrap();
        assert_eq!(events, vec![UserEvent::user_name_updated(id, "Adam Smith")]);

        user.apply_events(events);
        assert_eq!(user.name(), "Adam Smith");
        assert_eq!(user.version(), Version::new(2));
    }

    #[test]
    fn test_update_to_same_name_is_a_no_op() {
        let (user, _) = created();
        assert!(user.update_name("John Doe").unwrap().is_empty());
    }

    #[test]
    fn test_update_missing_user_fails() {
        assert!(matches!(
            User::default().update_name("Adam Smith"),
            Err(UserError::NotCreated)
        ));
    }
}
