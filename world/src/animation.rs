//! Frame-based sprite animation keyed by movement state.

use std::collections::BTreeMap;

use driftlands_core::{ImageHandle, TileFrame};

/// Movement state selecting which frame list plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnimationState {
    /// Standing still or moving mostly vertically.
    #[default]
    Idle,
    /// Moving toward negative x.
    WalkLeft,
    /// Moving toward positive x.
    WalkRight,
}

impl AnimationState {
    /// Every state in sheet row order.
    pub const ALL: [Self; 3] = [Self::Idle, Self::WalkLeft, Self::WalkRight];
}

/// Pixel rectangle cut out of a sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRegion {
    /// Top-left pixel of the region.
    pub origin: TileFrame,
    /// Region width in pixels.
    pub width: u16,
    /// Region height in pixels.
    pub height: u16,
}

/// One drawable animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteFrame {
    /// Image the frame is taken from.
    pub image: ImageHandle,
    /// Part of `image` to draw; the whole image when absent.
    pub region: Option<FrameRegion>,
}

/// Per-state frame lists and the playback cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    states: BTreeMap<AnimationState, Vec<SpriteFrame>>,
    state: AnimationState,
    frame: usize,
    frame_time: f32,
    timer: f32,
}

impl Animation {
    /// Creates an idle animation without frames that steps every `frame_time` seconds.
    #[must_use]
    pub fn new(frame_time: f32) -> Self {
        Self {
            states: BTreeMap::new(),
            state: AnimationState::Idle,
            frame: 0,
            frame_time,
            timer: 0.0,
        }
    }

    /// Returns the animation with `frames` assigned to `state`.
    #[must_use]
    pub fn with_frames(mut self, state: AnimationState, frames: Vec<SpriteFrame>) -> Self {
        let _ = self.states.insert(state, frames);
        self
    }

    /// Cuts `count` square frames of edge `size` from row `row` of `sheet`.
    ///
    /// Frames that would extend past the sheet's right edge are dropped.
    #[must_use]
    pub fn sheet_row(sheet: ImageHandle, row: u16, size: u16, count: u16) -> Vec<SpriteFrame> {
        let fitting = sheet
            .width()
            .checked_div(u32::from(size))
            .map_or(0, |fit| u16::try_from(fit).unwrap_or(u16::MAX));
        (0..count.min(fitting))
            .map(|column| SpriteFrame {
                image: sheet,
                region: Some(FrameRegion {
                    origin: TileFrame::new(column.saturating_mul(size), row.saturating_mul(size)),
                    width: size,
                    height: size,
                }),
            })
            .collect()
    }

    /// State currently playing.
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Index of the displayed frame within the current state's list.
    #[must_use]
    pub fn frame_index(&self) -> usize {
        self.frame
    }

    /// Seconds each frame stays on screen.
    #[must_use]
    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    /// Frames assigned to `state`.
    #[must_use]
    pub fn frames(&self, state: AnimationState) -> &[SpriteFrame] {
        self.states
            .get(&state)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Switches to `state`, restarting from its first frame when it differs.
    ///
    /// Returns whether the state changed.
    pub fn set_state(&mut self, state: AnimationState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        self.frame = 0;
        self.timer = 0.0;
        true
    }

    /// Accumulates `dt` seconds and steps to the next frame once a frame time elapsed.
    ///
    /// The index wraps to the first frame after the last. States without
    /// frames do not accumulate time. Returns whether the frame changed.
    pub fn advance(&mut self, dt: f32) -> bool {
        let count = self.frames(self.state).len();
        if count == 0 {
            return false;
        }
        self.timer += dt;
        if self.timer < self.frame_time {
            return false;
        }
        self.timer = 0.0;
        self.frame = (self.frame + 1) % count;
        true
    }

    /// Frame to draw, if the current state has any.
    #[must_use]
    pub fn current(&self) -> Option<SpriteFrame> {
        let frames = self.frames(self.state);
        frames.get(self.frame % frames.len().max(1)).copied()
    }
}
