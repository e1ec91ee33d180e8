//! Visual themes and the process-wide style root they are applied to.
//!
//! Nothing in the collection pipeline reads this state; it exists so a
//! presentation layer has one place to pick up the active CSS variables.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// HSL triples ("340 70% 55%") for the themeable colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary: String,
    pub accent: String,
    pub background: String,
}

/// A named color scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub colors: ThemeColors,
}

impl Theme {
    fn preset(id: &str, name: &str, primary: &str, accent: &str, background: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            colors: ThemeColors {
                primary: primary.to_string(),
                accent: accent.to_string(),
                background: background.to_string(),
            },
        }
    }

    /// Built-in themes; the first one is the default
    pub fn presets() -> Vec<Theme> {
        vec![
            Theme::preset("sakura", "Sakura", "340 70% 55%", "185 80% 50%", "230 25% 7%"),
            Theme::preset("ocean", "Ocean", "210 80% 55%", "185 80% 50%", "220 30% 8%"),
            Theme::preset("sunset", "Sunset", "25 90% 55%", "45 90% 55%", "15 20% 8%"),
            Theme::preset("forest", "Forest", "150 60% 45%", "120 50% 40%", "160 20% 7%"),
        ]
    }

    pub fn find(id: &str) -> Option<Theme> {
        Self::presets().into_iter().find(|t| t.id == id)
    }

    /// CSS custom properties this theme sets
    pub fn style_properties(&self) -> BTreeMap<String, String> {
        let c = &self.colors;
        let mut props = BTreeMap::new();
        props.insert("--primary".to_string(), c.primary.clone());
        props.insert("--accent".to_string(), c.accent.clone());
        props.insert("--background".to_string(), c.background.clone());
        props.insert(
            "--gradient-primary".to_string(),
            format!(
                "linear-gradient(135deg, hsl({}) 0%, hsl({}) 100%)",
                c.primary, c.accent
            ),
        );
        props.insert(
            "--shadow-glow".to_string(),
            format!("0 0 30px hsl({} / 0.3)", c.primary),
        );
        props
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::preset("sakura", "Sakura", "340 70% 55%", "185 80% 50%", "230 25% 7%")
    }
}

#[derive(Debug, Default)]
struct StyleRoot {
    theme_id: Option<String>,
    properties: BTreeMap<String, String>,
}

static STYLE_ROOT: Lazy<RwLock<StyleRoot>> = Lazy::new(|| RwLock::new(StyleRoot::default()));

/// Write a theme's properties into the shared style root
pub fn apply_theme(theme: &Theme) {
    let mut root = STYLE_ROOT.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    root.properties.extend(theme.style_properties());
    root.theme_id = Some(theme.id.clone());
    tracing::debug!(theme = %theme.id, "Theme applied");
}

/// Id of the last applied theme, if any
pub fn current_theme_id() -> Option<String> {
    let root = STYLE_ROOT.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    root.theme_id.clone()
}

/// Snapshot of the style root's properties
pub fn current_style() -> BTreeMap<String, String> {
    let root = STYLE_ROOT.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    root.properties.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let presets = Theme::presets();
        assert_eq!(presets.len(), 4);
        assert_eq!(presets[0], Theme::default());
        assert!(Theme::find("ocean").is_some());
        assert!(Theme::find("neon").is_none());
    }

    #[test]
    fn test_apply_theme_writes_style_root() {
        let forest = Theme::find("forest").unwrap();
        apply_theme(&forest);

        // The root is process-wide; other tests may apply themes concurrently,
        // so only check the properties this theme is known to own.
        let style = current_style();
        assert!(style.contains_key("--primary"));
        assert!(style.contains_key("--shadow-glow"));
        assert!(current_theme_id().is_some());
    }

    #[test]
    fn test_style_properties() {
        let props = Theme::default().style_properties();
        assert_eq!(props["--primary"], "340 70% 55%");
        assert!(props["--gradient-primary"].contains("hsl(185 80% 50%)"));
    }
}
