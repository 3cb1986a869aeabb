//! Named colours accepted by voice commands.

/// A voice-addressable colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub hex: &'static str,
}

impl NamedColor {
    const fn new(name: &'static str, hex: &'static str) -> Self {
        Self { name, hex }
    }

    /// Upper-case name for HUD messages.
    pub fn label(&self) -> String {
        self.name.to_ascii_uppercase()
    }
}

/// Ambient colour before any colour command.
pub const DEFAULT_AMBIENT_COLOR: &str = "#22d3ee";

pub const NAMED_COLORS: [NamedColor; 13] = [
    NamedColor::new("red", "#ff2a2a"),
    NamedColor::new("green", "#2aff2a"),
    NamedColor::new("blue", "#2a2aff"),
    NamedColor::new("white", "#ffffff"),
    NamedColor::new("cyan", "#22d3ee"),
    NamedColor::new("purple", "#bd00ff"),
    NamedColor::new("pink", "#ff00bd"),
    NamedColor::new("orange", "#ff7f00"),
    NamedColor::new("yellow", "#ffff00"),
    NamedColor::new("magenta", "#ff00ff"),
    NamedColor::new("teal", "#008080"),
    NamedColor::new("violet", "#8f00ff"),
    NamedColor::new("gold", "#ffd700"),
];

/// First colour (in table order) whose name occurs in `text`.
///
/// `text` must already be lower-case.
pub fn find_in(text: &str) -> Option<&'static NamedColor> {
    NAMED_COLORS.iter().find(|c| text.contains(c.name))
}
