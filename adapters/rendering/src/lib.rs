#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Driftlands adapters.
//!
//! Scenes describe each frame as a [`DrawList`] of screen-space commands;
//! backends execute the list and feed input back through [`FrameInput`].

use anyhow::Result as AnyResult;
use driftlands_core::{HeldDirections, ImageHandle, ImageSet, Tint};
use glam::Vec2;
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 255)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

impl From<Tint> for Color {
    fn from(tint: Tint) -> Self {
        Self::from_rgb_u8(tint.red(), tint.green(), tint.blue())
    }
}

/// Sub-rectangle of an image, in image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceRect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// One screen-space drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Draws an image, or part of it, stretched into a rectangle.
    Image {
        /// Image to draw.
        image: ImageHandle,
        /// Portion of the image to draw; the whole image when absent.
        source: Option<SourceRect>,
        /// Top-left corner on screen.
        position: Vec2,
        /// Size on screen.
        size: Vec2,
        /// Colour multiplier.
        tint: Color,
    },
    /// Fills a rectangle.
    Rect {
        /// Top-left corner on screen.
        position: Vec2,
        /// Size on screen.
        size: Vec2,
        /// Fill colour.
        color: Color,
    },
    /// Outlines a rectangle.
    RectOutline {
        /// Top-left corner on screen.
        position: Vec2,
        /// Size on screen.
        size: Vec2,
        /// Stroke width.
        thickness: f32,
        /// Stroke colour.
        color: Color,
    },
    /// Draws a line segment.
    Line {
        /// Start point on screen.
        from: Vec2,
        /// End point on screen.
        to: Vec2,
        /// Stroke width.
        thickness: f32,
        /// Stroke colour.
        color: Color,
    },
    /// Fills a circle.
    Circle {
        /// Centre on screen.
        center: Vec2,
        /// Radius on screen.
        radius: f32,
        /// Fill colour.
        color: Color,
    },
    /// Outlines a circle.
    CircleOutline {
        /// Centre on screen.
        center: Vec2,
        /// Radius on screen.
        radius: f32,
        /// Stroke width.
        thickness: f32,
        /// Stroke colour.
        color: Color,
    },
    /// Draws a line of text whose top-left corner sits at `position`.
    Text {
        /// Text to draw.
        text: String,
        /// Top-left corner on screen.
        position: Vec2,
        /// Font size in pixels.
        font_size: f32,
        /// Text colour.
        color: Color,
    },
}

/// Ordered commands describing one frame, drawn back to front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Removes every command while keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Commands in drawing order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Reports whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Directions currently held down.
    pub held: HeldDirections,
    /// Whether the grid classification overlay toggle was pressed this frame.
    pub toggle_grid_overlay: bool,
    /// Whether the spawner overlay toggle was pressed this frame.
    pub toggle_spawner_overlay: bool,
    /// Size of the drawable area in screen pixels.
    pub viewport: Vec2,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Initial window size in screen pixels.
    pub window_size: Vec2,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, window_size: Vec2) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            window_size,
        }
    }
}

/// Rendering backend capable of presenting Driftlands scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// Once the window exists and images are loaded, `setup` receives the
    /// loaded [`ImageSet`] and returns the per-frame callback. The callback
    /// receives the frame delta and input and fills the provided draw list.
    fn run<S, F>(self, presentation: Presentation, setup: S) -> AnyResult<()>
    where
        S: FnOnce(ImageSet) -> F + 'static,
        F: FnMut(Duration, FrameInput, &mut DrawList) + 'static;
}
