pub const THEME_KEY: &str = "tokio-theme";
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn pressed(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "☀",
            Self::Dark => "☾",
        }
    }
}

/// Where the active theme lives: an attribute on the document body and a
/// persisted copy in local storage.
pub trait ThemeHost {
    fn attribute(&self) -> Option<String>;
    fn set_attribute(&self, value: &str);
    fn stored(&self) -> Option<String>;
    fn store(&self, value: &str);

    /// Value accepted by `set_attribute` but not yet written to the attribute,
    /// e.g. while an animated switch is in flight.
    fn pending(&self) -> Option<String> {
        None
    }
}

/// Flips the theme. Anything other than an explicit `dark` counts as light,
/// so an unset attribute switches to dark. A pending write counts as the
/// current value, so rapid toggles never read a stale attribute.
pub fn toggle_theme(host: &impl ThemeHost) -> Theme {
    let current = host
        .pending()
        .or_else(|| host.attribute())
        .as_deref()
        .and_then(Theme::parse);
    let next = match current {
        Some(Theme::Dark) => Theme::Light,
        _ => Theme::Dark,
    };

    host.set_attribute(next.as_str());
    host.store(next.as_str());
    next
}

pub fn initial_theme(host: &impl ThemeHost, system_prefers_dark: bool) -> Theme {
    host.stored()
        .as_deref()
        .and_then(Theme::parse)
        .unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
}

pub fn apply_initial_theme(host: &impl ThemeHost, system_prefers_dark: bool) -> Theme {
    let theme = initial_theme(host, system_prefers_dark);
    host.set_attribute(theme.as_str());
    theme
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryHost {
        attribute: RefCell<Option<String>>,
        storage: RefCell<Option<String>>,
    }

    impl MemoryHost {
        fn with(attribute: Option<&str>, storage: Option<&str>) -> Self {
            Self {
                attribute: RefCell::new(attribute.map(ToString::to_string)),
                storage: RefCell::new(storage.map(ToString::to_string)),
            }
        }
    }

    impl ThemeHost for MemoryHost {
        fn attribute(&self) -> Option<String> {
            self.attribute.borrow().clone()
        }

        fn set_attribute(&self, value: &str) {
            *self.attribute.borrow_mut() = Some(value.to_string());
        }

        fn stored(&self) -> Option<String> {
            self.storage.borrow().clone()
        }

        fn store(&self, value: &str) {
            *self.storage.borrow_mut() = Some(value.to_string());
        }
    }

    #[test]
    fn toggling_twice_restores_attribute_and_storage() {
        for start in ["light", "dark"] {
            let host = MemoryHost::with(Some(start), Some(start));

            toggle_theme(&host);
            assert_ne!(host.attribute().as_deref(), Some(start));

            toggle_theme(&host);
            assert_eq!(host.attribute().as_deref(), Some(start));
            assert_eq!(host.stored().as_deref(), Some(start));
        }
    }

    #[test]
    fn unset_attribute_switches_to_dark_then_light() {
        let host = MemoryHost::default();

        assert_eq!(toggle_theme(&host), Theme::Dark);
        assert_eq!(host.attribute().as_deref(), Some("dark"));
        assert_eq!(host.stored().as_deref(), Some("dark"));

        assert_eq!(toggle_theme(&host), Theme::Light);
        assert_eq!(host.attribute().as_deref(), Some("light"));
        assert_eq!(host.stored().as_deref(), Some("light"));
    }

    /// Holds attribute writes until `flush`, like a browser running the
    /// update inside a view transition callback.
    #[derive(Default)]
    struct DeferredHost {
        inner: MemoryHost,
        queued: RefCell<Vec<String>>,
    }

    impl DeferredHost {
        fn flush(&self) {
            for value in self.queued.borrow_mut().drain(..) {
                self.inner.set_attribute(&value);
            }
        }
    }

    impl ThemeHost for DeferredHost {
        fn attribute(&self) -> Option<String> {
            self.inner.attribute()
        }

        fn set_attribute(&self, value: &str) {
            self.queued.borrow_mut().push(value.to_string());
        }

        fn stored(&self) -> Option<String> {
            self.inner.stored()
        }

        fn store(&self, value: &str) {
            self.inner.store(value);
        }

        fn pending(&self) -> Option<String> {
            self.queued.borrow().last().cloned()
        }
    }

    #[test]
    fn rapid_toggles_see_the_pending_theme() {
        let host = DeferredHost {
            inner: MemoryHost::with(Some("light"), Some("light")),
            ..Default::default()
        };

        assert_eq!(toggle_theme(&host), Theme::Dark);
        assert_eq!(host.attribute().as_deref(), Some("light"));
        assert_eq!(toggle_theme(&host), Theme::Light);
        assert_eq!(host.stored().as_deref(), Some("light"));

        host.flush();
        assert_eq!(host.attribute().as_deref(), Some("light"));
        assert_eq!(host.pending(), None);
        assert_eq!(toggle_theme(&host), Theme::Dark);
    }

    #[test]
    fn unknown_attribute_value_counts_as_light() {
        let host = MemoryHost::with(Some("sepia"), None);
        assert_eq!(toggle_theme(&host), Theme::Dark);
    }

    #[test]
    fn stored_preference_beats_system_preference() {
        let host = MemoryHost::with(None, Some("light"));
        assert_eq!(apply_initial_theme(&host, true), Theme::Light);
        assert_eq!(host.attribute().as_deref(), Some("light"));

        let host = MemoryHost::with(None, Some("bogus"));
        assert_eq!(initial_theme(&host, true), Theme::Dark);
        assert_eq!(initial_theme(&host, false), Theme::Light);
    }

    #[test]
    fn labels_describe_the_next_theme() {
        assert_eq!(Theme::Light.toggle_label(), "Switch to dark theme");
        assert!(Theme::Dark.pressed());
        assert!(!Theme::Light.pressed());
    }
}
