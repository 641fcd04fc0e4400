//! Keyboard shortcut registry and documentation.

use mapink_core::ToolKind;

/// A keyboard shortcut definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub key: &'static str,
    pub description: &'static str,
    /// Only active while the annotation input has focus.
    pub in_text_input: bool,
}

impl Shortcut {
    pub const fn new(key: &'static str, description: &'static str) -> Self {
        Self {
            key,
            description,
            in_text_input: false,
        }
    }

    pub const fn text_input(key: &'static str, description: &'static str) -> Self {
        Self {
            key,
            description,
            in_text_input: true,
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = ToolKind::ALL
            .into_iter()
            .map(|tool| {
                let display = tool.display_name();
                // "Draw (2)" -> key "2"
                let key = display
                    .rsplit_once('(')
                    .map(|(_, key)| key.trim_end_matches(')'))
                    .unwrap_or(display);
                Shortcut::new(key, display)
            })
            .collect();
        shortcuts.push(Shortcut::new("Escape", "Switch to Pan"));
        shortcuts.push(Shortcut::new("Space", "Recenter on the project"));
        shortcuts.push(Shortcut::text_input("Enter", "Save the annotation"));
        shortcuts.push(Shortcut::text_input("Escape", "Leave the annotation input"));
        shortcuts
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            let scope = if shortcut.in_text_input { " (in annotation input)" } else { "" };
            println!("  {:10} {}{}", shortcut.key, shortcut.description, scope);
        }
        println!();
    }
}
