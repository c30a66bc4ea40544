/// Severity of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

/// Messages raised by sync actions, waiting for the host to show them.
///
/// Every message is also written to the log at the matching level.
#[derive(Debug, Default)]
pub struct NotificationManager {
    notifications: Vec<Notification>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let message = message.into();
        match level {
            NotificationLevel::Info => log::info!("{message}"),
            NotificationLevel::Warning => log::warn!("{message}"),
            NotificationLevel::Error => log::error!("{message}"),
        }
        self.notifications.push(Notification { message, level });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Info);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Error);
    }

    /// Take every pending notification, oldest first
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn count(&self) -> usize {
        self.notifications.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_recorded() {
        let mut manager = NotificationManager::new();

        manager.info("First");
        manager.warn("Second");
        manager.error("Third");

        assert_eq!(manager.count(), 3);
        let levels: Vec<_> = manager.drain().into_iter().map(|n| n.level).collect();
        assert_eq!(
            levels,
            vec![
                NotificationLevel::Info,
                NotificationLevel::Warning,
                NotificationLevel::Error
            ]
        );
    }

    #[test]
    fn drain_returns_oldest_first() {
        let mut manager = NotificationManager::new();
        manager.info("a");
        manager.warn("b");

        let drained = manager.drain();
        assert_eq!(drained[0].message, "a");
        assert_eq!(drained[1].message, "b");
        assert_eq!(manager.count(), 0);
        assert!(manager.drain().is_empty());
    }
}
