//! Reading-frame compatibility across a fusion junction.

use std::fmt;

use serde::Serialize;

use crate::partner::PartnerRole;
use crate::strand::Strand;
use crate::transcript::TranscriptModel;

use super::cds_length_to_breakpoint;

/// A breakpoint placed on one partner's reference transcript.
#[derive(Debug, Clone, Copy)]
pub struct PartnerBreakpoint<'a> {
    pub transcript: &'a TranscriptModel,
    pub position: i32,
    pub strand: Strand,
}

/// Reading-frame verdict for a fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    InFrame,
    OutOfFrame,
    Unknown,
}

impl FrameStatus {
    #[must_use]
    pub fn is_in_frame(self) -> bool {
        self == Self::InFrame
    }
}

impl From<Option<bool>> for FrameStatus {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::InFrame,
            Some(false) => Self::OutOfFrame,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InFrame => write!(f, "in-frame"),
            Self::OutOfFrame => write!(f, "out-of-frame"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Frame arithmetic on the coding lengths either side of the junction.
///
/// In frame when both lengths are whole codons, or when their remainders sum to 3 so a
/// single codon bridges the junction. The bridging codon's sequence is not checked.
#[must_use]
pub fn frame_compatible(len5: i32, len3: i32) -> bool {
    let r5 = len5.rem_euclid(3);
    let r3 = len3.rem_euclid(3);
    (r5 == 0 && r3 == 0) || r5 + r3 == 3
}

/// Decide whether fusing partner A's 5' part to partner B's 3' part keeps the frame.
///
/// `None` when either side's coding length cannot be determined.
#[must_use]
pub fn is_in_frame_fusion(a: PartnerBreakpoint<'_>, b: PartnerBreakpoint<'_>) -> Option<bool> {
    let len5 = cds_length_to_breakpoint(a.transcript, a.position, a.strand, PartnerRole::FivePrime)?;
    let len3 =
        cds_length_to_breakpoint(b.transcript, b.position, b.strand, PartnerRole::ThreePrime)?;
    Some(frame_compatible(len5, len3))
}
