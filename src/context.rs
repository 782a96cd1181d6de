//! Application context handed to the components that need to know whether
//! video playback is switched on.

use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct AppContext {
    /// Set by the host when the plugin is loaded and enabled
    plugin_enabled: bool,
    pub settings: Settings,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            plugin_enabled: true,
            settings,
        }
    }

    /// Host enable/disable hook
    pub fn set_plugin_enabled(&mut self, enabled: bool) {
        self.plugin_enabled = enabled;
    }

    /// Playback runs only when the host has the plugin enabled and the user
    /// setting allows it
    pub fn is_enabled(&self) -> bool {
        self.plugin_enabled && self.settings.enabled
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_requires_both_flags() {
        let mut context = AppContext::default();
        assert!(context.is_enabled());

        context.set_plugin_enabled(false);
        assert!(!context.is_enabled());

        context.set_plugin_enabled(true);
        context.settings.enabled = false;
        assert!(!context.is_enabled());
    }
}
