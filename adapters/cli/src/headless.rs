//! Windowless simulation runs.

use std::{io::Write, time::Duration};

use anyhow::{Context, Result};
use clap::ValueEnum;
use driftlands_core::{Event, GameConfig, HeldDirections, ImageSet};
use driftlands_rendering::FrameInput;
use driftlands_scene::{Adventure, Scene, SceneStatus};
use driftlands_world::{query, Grid, Inspect};
use glam::Vec2;

use crate::{log_events, WINDOW_SIZE};

/// Movement direction accepted by `--hold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

fn held(directions: &[Direction]) -> HeldDirections {
    let mut held = HeldDirections::default();
    for direction in directions {
        match direction {
            Direction::Up => held.up = true,
            Direction::Down => held.down = true,
            Direction::Left => held.left = true,
            Direction::Right => held.right = true,
        }
    }
    held
}

/// Fixed-step run with constant input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Simulation {
    frames: u32,
    frame: Duration,
    held: HeldDirections,
}

impl Simulation {
    pub(crate) fn new(frames: u32, frame_ms: u64, hold: &[Direction]) -> Self {
        Self {
            frames,
            frame: Duration::from_millis(frame_ms),
            held: held(hold),
        }
    }

    /// Runs until every frame elapsed or the player is defeated.
    pub(crate) fn run(&self, config: &GameConfig) -> Result<Report> {
        let mut events = Vec::new();
        let mut scene = Adventure::new(config, ImageSet::empty(), WINDOW_SIZE, &mut events)
            .context("failed to build the adventure scene")?;
        let mut tally = Tally::default();
        tally.record(&events);
        log_events(&events);

        let input = FrameInput {
            held: self.held,
            viewport: WINDOW_SIZE,
            ..FrameInput::default()
        };
        let mut simulated = 0;
        for _ in 0..self.frames {
            events.clear();
            scene.update(self.frame, &input, &mut events);
            simulated += 1;
            tally.record(&events);
            log_events(&events);
            if scene.status() == SceneStatus::Defeated {
                tracing::info!(frame = simulated, "simulation stopped: player defeated");
                break;
            }
        }

        Ok(Report {
            scene,
            frames: simulated,
            tally,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tally {
    expansions: u32,
    rebases: u32,
    spawned: u32,
    pickups: u32,
    unmapped: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::GridExpanded { .. } => self.expansions += 1,
                Event::WorldRebased { .. } => self.rebases += 1,
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::PickupCollected { .. } => self.pickups += 1,
                Event::BitmaskUnmapped { .. } => self.unmapped += 1,
                Event::HazardDamage { .. } | Event::PlayerDefeated { .. } => {}
            }
        }
    }
}

/// Outcome of a simulation run.
#[derive(Debug)]
pub(crate) struct Report {
    scene: Adventure,
    frames: u32,
    tally: Tally,
}

impl Report {
    pub(crate) fn write_summary(&self, out: &mut impl Write) -> std::io::Result<()> {
        let world = self.scene.world();
        let (columns, rows) = query::grid(world)
            .map(|grid: &Grid| (grid.columns(), grid.rows()))
            .unwrap_or_default();
        let position = query::player_position(world).unwrap_or(Vec2::ZERO);

        writeln!(out, "frames simulated: {}", self.frames)?;
        writeln!(out, "status: {:?}", self.scene.status())?;
        writeln!(out, "grid: {columns}x{rows}")?;
        writeln!(out, "player position: ({:.1}, {:.1})", position.x, position.y)?;
        writeln!(
            out,
            "health: {:.0}",
            query::player_health(world).unwrap_or_default()
        )?;
        writeln!(out, "score: {}", query::player_score(world).unwrap_or_default())?;
        writeln!(out, "entities: {}", query::entity_count(world))?;
        writeln!(
            out,
            "expansions: {} (rebased {}), enemies spawned: {}, pickups: {}, unmapped bitmasks: {}",
            self.tally.expansions,
            self.tally.rebases,
            self.tally.spawned,
            self.tally.pickups,
            self.tally.unmapped
        )
    }

    pub(crate) fn write_inspection(&self, out: &mut impl Write) -> std::io::Result<()> {
        let Some(inspector) = self.scene.inspector() else {
            return Ok(());
        };
        write_entities(inspector, out)
    }
}

fn write_entities(inspector: &dyn Inspect, out: &mut impl Write) -> std::io::Result<()> {
    for entity in inspector.entities() {
        writeln!(out, "entity {}", entity.get())?;
        for readout in inspector.describe(entity) {
            writeln!(out, "  {}: {}", readout.component, readout.value)?;
        }
    }
    Ok(())
}
