//! Presentation settings handed to track views.
//!
//! Rendering is the host's job. The core only decides *which* palette slot a
//! track uses in a given state, so hosts get consistent highlighting without
//! sharing global style state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Accent colour, used as background of the playing track.
    pub main: String,
    /// Borders, separators and the download progress bar.
    pub secondary: String,
    /// Foreground drawn on top of `main`.
    pub text: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            main: "#1f2933".to_string(),
            secondary: "#000000".to_string(),
            text: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacing {
    /// Inner padding of a track row, in pixels.
    pub padding_px: u16,
    /// Width of the separator between consecutive rows, in pixels.
    pub separator_px: u16,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            padding_px: 10,
            separator_px: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub palette: Palette,
    pub spacing: Spacing,
}

/// Resolved style for one track row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackStyle {
    /// `None` keeps the host's default background.
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub padding_px: u16,
    /// Bottom separator as `(width_px, colour)`; absent on the last row.
    pub separator: Option<(u16, String)>,
    /// Colour of the download progress bar.
    pub progress_color: String,
}

impl Theme {
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Style for a row. `highlighted` is set while the track is playing.
    pub fn track_style(&self, highlighted: bool, last_in_list: bool) -> TrackStyle {
        let (background, foreground) = if highlighted {
            (
                Some(self.palette.main.clone()),
                Some(self.palette.text.clone()),
            )
        } else {
            (None, None)
        };

        TrackStyle {
            background,
            foreground,
            padding_px: self.spacing.padding_px,
            separator: (!last_in_list && self.spacing.separator_px > 0)
                .then(|| (self.spacing.separator_px, self.palette.secondary.clone())),
            progress_color: self.palette.secondary.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let slots = [
            ("main", &self.palette.main),
            ("secondary", &self.palette.secondary),
            ("text", &self.palette.text),
        ];
        for (name, value) in slots {
            if value.trim().is_empty() {
                return Err(format!("palette colour '{}' cannot be empty", name));
            }
        }
        Ok(())
    }
}
