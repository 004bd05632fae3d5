//! Standard Frame filename convention: `S-D-G-T.ext`, where `S` is the
//! observatory/source, `D` the description, `G` the starting GPS time and
//! `T` the duration in seconds.
//!
//! Grounded on `framecpp/Common/FrameFilename.hh`.

use crate::error::{Error, Result};
use crate::model::FrameH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFilename {
    pub source: String,
    pub description: String,
    pub start_gps: u32,
    pub duration: u32,
    pub extension: String,
}

impl FrameFilename {
    /// Parse `S-D-G-T.ext`. Any other shape is `MetadataInvalid`.
    pub fn parse(name: &str) -> Result<FrameFilename> {
        let (stem, extension) = name
            .rsplit_once('.')
            .ok_or_else(|| Error::MetadataInvalid(format!("missing extension: {name}")))?;
        let parts: Vec<&str> = stem.split('-').collect();
        if parts.len() != 4 {
            return Err(Error::MetadataInvalid(format!(
                "expected S-D-G-T, got {} dash-separated fields in {name}",
                parts.len()
            )));
        }
        let start_gps = parts[2]
            .parse::<u32>()
            .map_err(|_| Error::MetadataInvalid(format!("non-numeric GPS start in {name}")))?;
        let duration = parts[3]
            .parse::<u32>()
            .map_err(|_| Error::MetadataInvalid(format!("non-numeric duration in {name}")))?;
        Ok(FrameFilename {
            source: parts[0].to_string(),
            description: parts[1].to_string(),
            start_gps,
            duration,
            extension: extension.to_string(),
        })
    }

    pub fn format(&self) -> String {
        format!(
            "{}-{}-{}-{}.{}",
            self.source, self.description, self.start_gps, self.duration, self.extension
        )
    }

    /// Cross-check against a decoded `FrameH`'s GPS time. `frame_duration`
    /// is the nominal per-frame duration (frames within a multi-frame file
    /// sum to the filename's duration, but the filename alone can't tell
    /// you how many frames were expected).
    pub fn check_against(&self, frame: &FrameH) -> Result<()> {
        if frame.gtime.seconds < self.start_gps {
            return Err(Error::MetadataMismatch(format!(
                "frame GPS time {} precedes filename start {}",
                frame.gtime.seconds, self.start_gps
            )));
        }
        if frame.gtime.seconds >= self.start_gps.saturating_add(self.duration) {
            return Err(Error::MetadataMismatch(format!(
                "frame GPS time {} falls outside filename window [{}, {})",
                frame.gtime.seconds,
                self.start_gps,
                self.start_gps + self.duration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_name() {
        let f = FrameFilename::parse("H-R-1000000000-16.gwf").unwrap();
        assert_eq!(f.source, "H");
        assert_eq!(f.description, "R");
        assert_eq!(f.start_gps, 1_000_000_000);
        assert_eq!(f.duration, 16);
        assert_eq!(f.extension, "gwf");
    }

    #[test]
    fn format_round_trips_parse() {
        let original = "H-R-1000000000-16.gwf";
        let f = FrameFilename::parse(original).unwrap();
        assert_eq!(f.format(), original);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = FrameFilename::parse("H-R-1000000000.gwf").unwrap_err();
        assert!(matches!(err, Error::MetadataInvalid(_)));
    }

    #[test]
    fn check_against_rejects_frame_outside_window() {
        let f = FrameFilename::parse("H-R-1000000000-16.gwf").unwrap();
        let frame = FrameH {
            gtime: crate::model::GpsTime { seconds: 999_999_999, nanoseconds: 0 },
            ..Default::default()
        };
        let err = f.check_against(&frame).unwrap_err();
        assert!(matches!(err, Error::MetadataMismatch(_)));
    }
}
