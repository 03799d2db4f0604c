//! Configuration for the client coordinator

use sotto_pipeline::DEFAULT_GROUP_NAME;

/// Configuration for a [`Client`](crate::Client)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Event broadcast channel capacity
    pub event_capacity: usize,
    /// In-flight capacity of the connection request feed
    pub request_capacity: usize,
    /// Placeholder name for group conversations without one
    pub default_group_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            event_capacity: 1024,
            request_capacity: 64,
            default_group_name: DEFAULT_GROUP_NAME.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Set the event channel capacity
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Set the request feed capacity
    pub fn with_request_capacity(mut self, capacity: usize) -> Self {
        self.request_capacity = capacity;
        self
    }

    /// Set the placeholder group name
    pub fn with_default_group_name(mut self, name: impl Into<String>) -> Self {
        self.default_group_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.event_capacity, 1024);
        assert_eq!(config.default_group_name, "New group");
    }

    #[test]
    fn test_builders_override_fields() {
        let config = ClientConfig::default()
            .with_event_capacity(8)
            .with_default_group_name("Untitled");
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.default_group_name, "Untitled");
    }
}
