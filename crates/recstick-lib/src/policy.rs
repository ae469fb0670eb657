//! Status-to-color policy — pure mapping, no side effects.

use crate::color::Color;
use crate::config::Palette;
use crate::status::Status;

/// Maps a recorder status (plus the "recording imminent" fact) to the
/// target color. Paused reports the "on" phase color; the alternation
/// itself is the flash controller's business.
#[derive(Debug, Clone)]
pub struct ColorPolicy {
    preview: Color,
    rec: Color,
    pause: Color,
    upcoming: Color,
    error: Color,
}

impl ColorPolicy {
    pub fn new(palette: &Palette) -> Self {
        ColorPolicy {
            preview: palette.preview,
            rec: palette.rec,
            pause: palette.pause,
            upcoming: palette.upcoming,
            error: palette.error,
        }
    }

    /// Resolve the target color for `status`. `upcoming` only matters while
    /// previewing (or still initializing): it promotes the preview color to
    /// the upcoming color.
    pub fn resolve(&self, status: Status, upcoming: bool) -> Color {
        match status {
            Status::Preview | Status::Init => {
                if upcoming {
                    self.upcoming
                } else {
                    self.preview
                }
            }
            Status::Recording => self.rec,
            Status::Paused => self.pause,
            Status::Error => self.error,
            Status::Upcoming => self.upcoming,
        }
    }
}
