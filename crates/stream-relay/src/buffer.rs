//! Render buffer: the rendered transcript of one turn.

use crate::split::LengthUnit;

/// Accumulated rendered segments. Lengths are in the platform's [`LengthUnit`].
#[derive(Debug, Clone, Default)]
pub struct RenderBuffer {
    text: String,
    unit: LengthUnit,
    len: usize,
    segments: usize,
}

impl RenderBuffer {
    pub fn new(unit: LengthUnit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    pub fn push(&mut self, segment: &str) {
        self.text.push_str(segment);
        self.len += self.unit.measure(segment);
        self.segments += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the transcript in this buffer's unit.
    pub fn measured_len(&self) -> usize {
        self.len
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    /// True when nothing visible has been rendered.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
