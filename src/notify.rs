use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Info => write!(f, "[info] {}", self.text),
            Level::Error => write!(f, "[error] {}", self.text),
        }
    }
}

/// Bounded history of user-facing messages. Everything pushed here is also
/// forwarded to the process log.
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        match notification.level {
            Level::Info => log::info!("{}", notification.text),
            Level::Error => log::error!("{}", notification.text),
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(notification);
    }

    pub fn extend(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.push(notification);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_when_full() {
        let mut log = NotificationLog::new(2);
        log.push(Notification::info("one"));
        log.push(Notification::info("two"));
        log.push(Notification::error("three"));

        let texts: Vec<&str> = log.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(log.latest(), Some(&Notification::error("three")));
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let mut log = NotificationLog::new(0);
        log.extend([Notification::info("a"), Notification::info("b")]);
        let texts: Vec<&str> = log.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["b"]);
    }

    #[test]
    fn display_prefixes_level() {
        assert_eq!(Notification::info("Selecting X").to_string(), "[info] Selecting X");
        assert_eq!(
            Notification::error("No controls selected").to_string(),
            "[error] No controls selected"
        );
    }

    #[test]
    fn latest_tracks_the_newest_entry() {
        let mut log = NotificationLog::new(4);
        assert!(log.latest().is_none());
        assert!(log.is_empty());

        log.push(Notification::info("Selecting X"));
        assert_eq!(log.latest().map(|n| n.text.as_str()), Some("Selecting X"));

        log.push(Notification::error("No controls selected"));
        let latest = log.latest().unwrap();
        assert!(latest.is_error());
        assert_eq!(latest.text, "No controls selected");
    }
}
