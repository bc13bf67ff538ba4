use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};

/// Name of a payload-less event, the key of a script's handler table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    /// Raised on every scripted entity when the level starts
    pub const INIT: EventName = EventName::from_static("init");
    /// Raised on a zone's detector when the controlled object enters the zone
    pub const CONTROLLEDZONE_ENTER: EventName = EventName::from_static("controlledzone_enter");
    /// Raised on a zone's detector when the controlled object leaves the zone
    pub const CONTROLLEDZONE_LEAVE: EventName = EventName::from_static("controlledzone_leave");

    pub const fn from_static(name: &'static str) -> Self {
        EventName(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        EventName(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EventName {
    fn from(name: &'static str) -> Self {
        EventName::from_static(name)
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        EventName::new(name)
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
