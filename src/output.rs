//! Per-frame recording of selected ear outputs, laid out `[frame][ear][channel]`.

use serde::{Deserialize, Serialize};

use crate::ear::Ear;

/// Which outputs `Ears::process_segment` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSelection {
    /// Neural activity pattern (IHC output).
    pub nap: bool,
    /// Basilar-membrane motion (cascade output).
    pub bm: bool,
    /// OHC velocity memory.
    pub ohc: bool,
    /// AGC-controlled undamping.
    pub agc: bool,
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self {
            nap: true,
            bm: false,
            ohc: false,
            agc: false,
        }
    }
}

impl OutputSelection {
    pub fn all() -> Self {
        Self {
            nap: true,
            bm: true,
            ohc: true,
            agc: true,
        }
    }
}

/// Flat frame buffer for one output kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    n_ears: usize,
    n_channels: usize,
    data: Vec<f32>,
}

impl FrameBuffer {
    fn with_capacity(n_ears: usize, n_channels: usize, n_frames: usize) -> Self {
        Self {
            n_ears,
            n_channels,
            data: Vec::with_capacity(n_ears * n_channels * n_frames),
        }
    }

    #[inline]
    fn frame_len(&self) -> usize {
        self.n_ears * self.n_channels
    }

    pub fn n_frames(&self) -> usize {
        match self.frame_len() {
            0 => 0,
            len => self.data.len() / len,
        }
    }

    /// All ears of frame `t`, ear-major.
    pub fn frame(&self, t: usize) -> &[f32] {
        let len = self.frame_len();
        &self.data[t * len..(t + 1) * len]
    }

    /// Channels of `ear` in frame `t`.
    pub fn get(&self, t: usize, ear: usize) -> &[f32] {
        let start = t * self.frame_len() + ear * self.n_channels;
        &self.data[start..start + self.n_channels]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Recorded outputs of a processed segment. Unselected outputs are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CarfacOutput {
    pub n_ears: usize,
    pub n_channels: usize,
    pub nap: Option<FrameBuffer>,
    pub bm: Option<FrameBuffer>,
    pub ohc: Option<FrameBuffer>,
    pub agc: Option<FrameBuffer>,
}

impl CarfacOutput {
    pub fn new(selection: OutputSelection, n_ears: usize, n_channels: usize, n_frames: usize) -> Self {
        let buf = |on: bool| on.then(|| FrameBuffer::with_capacity(n_ears, n_channels, n_frames));
        Self {
            n_ears,
            n_channels,
            nap: buf(selection.nap),
            bm: buf(selection.bm),
            ohc: buf(selection.ohc),
            agc: buf(selection.agc),
        }
    }

    /// Frames recorded so far.
    pub fn n_frames(&self) -> usize {
        [&self.nap, &self.bm, &self.ohc, &self.agc]
            .into_iter()
            .flatten()
            .map(FrameBuffer::n_frames)
            .next()
            .unwrap_or(0)
    }

    /// Append one frame from the current state of `ears`.
    pub(crate) fn record(&mut self, ears: &[Ear]) {
        debug_assert_eq!(ears.len(), self.n_ears);
        let taps: [(&mut Option<FrameBuffer>, fn(&Ear) -> &[f32]); 4] = [
            (&mut self.nap, Ear::nap),
            (&mut self.bm, Ear::bm),
            (&mut self.ohc, Ear::ohc),
            (&mut self.agc, Ear::agc_zb),
        ];
        for (buf, read) in taps {
            if let Some(buf) = buf {
                for ear in ears {
                    buf.data.extend_from_slice(read(ear));
                }
            }
        }
    }
}
