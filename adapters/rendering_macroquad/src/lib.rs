#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Driftlands.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The backend owns the window, loads images listed in the manifest, polls
//! the keyboard into a [`FrameInput`] and executes the [`DrawList`] the
//! scene produces each frame.

mod images;

pub use self::images::ImageLibrary;

use anyhow::{Context, Result};
use driftlands_core::HeldDirections;
use driftlands_rendering::{
    Color, DrawCommand, DrawList, FrameInput, Presentation, RenderingBackend, SourceRect,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_down, is_key_pressed, KeyCode},
    math::{Rect, Vec2 as MacroquadVec2},
    shapes::{draw_circle, draw_circle_lines, draw_line, draw_rectangle, draw_rectangle_lines},
    text::draw_text,
    texture::{draw_texture_ex, DrawTextureParams},
};
use std::{path::PathBuf, sync::mpsc, time::Duration};

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `F1` toggles the grid classification overlay.
    toggle_grid_overlay: bool,
    /// `F2` toggles the spawner overlay.
    toggle_spawner_overlay: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            toggle_grid_overlay: is_key_pressed(KeyCode::F1),
            toggle_spawner_overlay: is_key_pressed(KeyCode::F2),
        }
    }
}

/// Collects held movement keys; arrows and WASD are interchangeable.
fn held_directions(is_down: impl Fn(KeyCode) -> bool) -> HeldDirections {
    HeldDirections {
        up: is_down(KeyCode::Up) || is_down(KeyCode::W),
        down: is_down(KeyCode::Down) || is_down(KeyCode::S),
        left: is_down(KeyCode::Left) || is_down(KeyCode::A),
        right: is_down(KeyCode::Right) || is_down(KeyCode::D),
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    manifest_path: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            manifest_path: ImageLibrary::default_manifest_path(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Overrides the manifest listing the images to load.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<S, F>(self, presentation: Presentation, setup: S) -> Result<()>
    where
        S: FnOnce(driftlands_core::ImageSet) -> F + 'static,
        F: FnMut(Duration, FrameInput, &mut DrawList) + 'static,
    {
        let Self {
            swap_interval,
            manifest_path,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            window_size,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size.x as i32,
            window_height: window_size.y as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let library = match ImageLibrary::from_manifest_path(&manifest_path)
                .with_context(|| format!("failed to load images from {}", manifest_path.display()))
            {
                Ok(library) => library,
                Err(error) => {
                    let _ = init_sender.send(Err(error));
                    return;
                }
            };
            let _ = init_sender.send(Ok(()));
            tracing::info!(images = library.len(), "window ready");

            let mut update_frame = setup(library.images());
            let background = to_macroquad_color(clear_color);
            let mut list = DrawList::new();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = FrameInput {
                    held: held_directions(is_key_down),
                    toggle_grid_overlay: keyboard.toggle_grid_overlay,
                    toggle_spawner_overlay: keyboard.toggle_spawner_overlay,
                    viewport: Vec2::new(
                        macroquad::window::screen_width(),
                        macroquad::window::screen_height(),
                    ),
                };

                list.clear();
                update_frame(frame_dt, frame_input, &mut list);
                execute(&list, &library);

                macroquad::window::next_frame().await;
            }

            library.release();
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn execute(list: &DrawList, library: &ImageLibrary) {
    for command in list.commands() {
        match command {
            DrawCommand::Image {
                image,
                source,
                position,
                size,
                tint,
            } => match library.texture(*image) {
                Some(texture) => draw_texture_ex(
                    texture,
                    position.x,
                    position.y,
                    to_macroquad_color(*tint),
                    DrawTextureParams {
                        dest_size: Some(MacroquadVec2::new(size.x, size.y)),
                        source: source.map(to_macroquad_rect),
                        ..DrawTextureParams::default()
                    },
                ),
                None => draw_rectangle(
                    position.x,
                    position.y,
                    size.x,
                    size.y,
                    to_macroquad_color(*tint),
                ),
            },
            DrawCommand::Rect {
                position,
                size,
                color,
            } => draw_rectangle(
                position.x,
                position.y,
                size.x,
                size.y,
                to_macroquad_color(*color),
            ),
            DrawCommand::RectOutline {
                position,
                size,
                thickness,
                color,
            } => draw_rectangle_lines(
                position.x,
                position.y,
                size.x,
                size.y,
                *thickness,
                to_macroquad_color(*color),
            ),
            DrawCommand::Line {
                from,
                to,
                thickness,
                color,
            } => draw_line(from.x, from.y, to.x, to.y, *thickness, to_macroquad_color(*color)),
            DrawCommand::Circle {
                center,
                radius,
                color,
            } => draw_circle(center.x, center.y, *radius, to_macroquad_color(*color)),
            DrawCommand::CircleOutline {
                center,
                radius,
                thickness,
                color,
            } => draw_circle_lines(
                center.x,
                center.y,
                *radius,
                *thickness,
                to_macroquad_color(*color),
            ),
            DrawCommand::Text {
                text,
                position,
                font_size,
                color,
            } => {
                let baseline = text_baseline(*position, *font_size);
                let _ = draw_text(
                    text,
                    baseline.x,
                    baseline.y,
                    *font_size,
                    to_macroquad_color(*color),
                );
            }
        }
    }
}

/// Macroquad anchors text at its baseline rather than its top-left corner.
fn text_baseline(top_left: Vec2, font_size: f32) -> Vec2 {
    Vec2::new(top_left.x, top_left.y + font_size)
}

fn to_macroquad_rect(source: SourceRect) -> Rect {
    Rect::new(source.x, source.y, source.width, source.height)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_both_steer() {
        let held = held_directions(|key| matches!(key, KeyCode::Left | KeyCode::W));
        assert_eq!(
            held,
            HeldDirections {
                up: true,
                down: false,
                left: true,
                right: false,
            }
        );
        assert!(held_directions(|_| false).is_idle());
    }

    #[test]
    fn text_is_shifted_to_its_baseline() {
        assert_eq!(
            text_baseline(Vec2::new(10.0, 30.0), 20.0),
            Vec2::new(10.0, 50.0)
        );
    }

    #[test]
    fn source_rect_maps_field_by_field() {
        let rect = to_macroquad_rect(SourceRect {
            x: 16.0,
            y: 32.0,
            width: 16.0,
            height: 16.0,
        });
        assert_eq!((rect.x, rect.y, rect.w, rect.h), (16.0, 32.0, 16.0, 16.0));
    }

    #[test]
    fn colors_keep_alpha() {
        let color = to_macroquad_color(Color::from_rgba_u8(255, 0, 0, 128));
        assert_eq!(color.r, 1.0);
        assert!((color.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn vsync_maps_to_swap_interval() {
        assert_eq!(MacroquadBackend::new().with_vsync(true).swap_interval, Some(1));
        assert_eq!(MacroquadBackend::new().with_vsync(false).swap_interval, Some(0));
        assert_eq!(MacroquadBackend::new().swap_interval, None);
    }
}
