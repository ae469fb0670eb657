//! Recorder status model.
//!
//! `Upcoming` is synthesized by the coordinator when a scheduled recording
//! falls inside the lookahead window; the host never pushes it.

use std::fmt;
use std::str::FromStr;

/// Operational phase of the recording service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Init,
    Preview,
    Recording,
    Paused,
    Error,
    /// Previewing with a scheduled recording inside the lookahead window.
    Upcoming,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Init,
        Status::Preview,
        Status::Recording,
        Status::Paused,
        Status::Error,
        Status::Upcoming,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Init => "init",
            Status::Preview => "preview",
            Status::Recording => "recording",
            Status::Paused => "paused",
            Status::Error => "error",
            Status::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = crate::RecstickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "init" => Ok(Status::Init),
            "preview" => Ok(Status::Preview),
            "recording" | "rec" => Ok(Status::Recording),
            "paused" | "pause" => Ok(Status::Paused),
            "error" => Ok(Status::Error),
            "upcoming" => Ok(Status::Upcoming),
            other => Err(crate::RecstickError::Status(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_variants() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("rec".parse::<Status>().unwrap(), Status::Recording);
        assert_eq!("pause".parse::<Status>().unwrap(), Status::Paused);
    }

    #[test]
    fn parse_case_insensitive() {
        assert_eq!("Recording".parse::<Status>().unwrap(), Status::Recording);
        assert_eq!(" PREVIEW ".parse::<Status>().unwrap(), Status::Preview);
    }

    #[test]
    fn parse_unknown_is_err() {
        let err = "stopped".parse::<Status>().unwrap_err();
        assert!(err.to_string().contains("stopped"));
    }

    #[test]
    fn display_roundtrip() {
        for status in Status::ALL {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
    }
}
