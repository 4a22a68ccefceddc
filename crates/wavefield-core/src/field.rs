//! Audio-reactive particle field physics.
//!
//! A fixed-size population of particles integrated once per rendered
//! frame, driven by the band extractor's scalar outputs and by external
//! repulsor points. The field owns no audio state; it takes one band
//! snapshot per tick so a tick's physics are internally consistent even if
//! ingest races with it.

use crate::config::ParticleConfig;
use crate::spectral::{BandExtractor, SpectrumSource};
use crate::Result;
use glam::{Vec2, Vec3};
use rand::{Rng, RngExt};

/// Floats written per particle by [`ParticleSource::write_vertex_data`]:
/// `(pos.x, pos.y, r, g, b, size, life, max_life)`.
pub const PARTICLE_FLOATS: usize = 8;

// Color remap into the pastel range and size response, tuned in lockstep
// with the extractor's [0, 1] band outputs.
const COLOR_BASE: f32 = 0.4;
const COLOR_SPAN: f32 = 0.6;
const SIZE_BASE: f32 = 6.0;
const SIZE_HIGH: f32 = 6.0;
const SIZE_ENERGY: f32 = 4.0;

/// One particle. Fields are plain floats in a stable per-particle order so
/// a GPU consumer can map its state 1:1 across ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in normalized viewport space
    pub position: Vec2,
    /// Velocity in normalized units per 60 Hz-equivalent tick
    pub velocity: Vec2,
    /// RGB color in [0, 1]^3
    pub color: Vec3,
    /// Point size in pixels
    pub size: f32,
    /// Remaining life in (0, 1]; reaching 0 triggers a respawn
    pub life: f32,
    /// Life at spawn time
    pub max_life: f32,
}

/// Read-only access to the particle population.
///
/// Implemented by [`ParticleField`]; renderer variants consume this and
/// never mutate the field.
pub trait ParticleSource: Send + Sync {
    /// Index-stable view of the current population.
    fn particles(&self) -> &[Particle];

    /// Serialize particles into a caller-owned interleaved scratch buffer,
    /// [`PARTICLE_FLOATS`] per particle in index order. Writes as many
    /// whole particles as fit; returns the number of floats written.
    fn write_vertex_data(&self, out: &mut [f32]) -> usize;
}

/// Per-frame physics integrator for a fixed particle population.
pub struct ParticleField {
    particles: Vec<Particle>,
    config: ParticleConfig,
    last_time: f64,
}

impl ParticleField {
    /// Spawn the initial population.
    pub fn new(config: ParticleConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = rand::rng();
        let particles = (0..config.count).map(|_| spawn_particle(&mut rng)).collect();
        Ok(Self {
            particles,
            config,
            last_time: 0.0,
        })
    }

    /// Advance the simulation to `now` (seconds, monotonically
    /// non-decreasing, supplied by the render loop).
    ///
    /// A non-positive delta is a clock guard: the whole tick is skipped
    /// and state is preserved. Band values and energy are snapshotted
    /// once per tick from a single consistent frame view, not re-read
    /// per particle. Each particle updates independently; population
    /// size never changes.
    pub fn update<S: SpectrumSource + ?Sized>(
        &mut self,
        now: f64,
        audio: &BandExtractor<S>,
        repulsors: &[Vec2],
    ) {
        let dt = (now - self.last_time) as f32;
        if dt <= 0.0 {
            return;
        }
        self.last_time = now;

        let cfg = &self.config;
        let snapshot = audio.snapshot(&cfg.bands);
        let (bass, mid, high, energy) =
            (snapshot.bass, snapshot.mid, snapshot.high, snapshot.energy);

        // Tuned for 60 Hz; scale so actual dt produces equivalent motion
        let step = dt * 60.0;
        let mut rng = rand::rng();

        for slot in &mut self.particles {
            let mut position = slot.position + slot.velocity * step;
            let mut velocity = slot.velocity;

            velocity.y -= cfg.gravity;

            for repulsor in repulsors {
                let away = position - *repulsor;
                let distance = away.length();
                if distance > cfg.repulsor_min_dist && distance < cfg.repulsor_max_dist {
                    // Inverse-square repulsion; the distance floor keeps
                    // the impulse finite
                    velocity += away * (cfg.repulsor_strength / (distance * distance));
                    velocity.y += cfg.repulsor_lift / distance;
                }
            }

            // Stochastic forcing from percussive energy
            velocity += Vec2::new(
                (rng.random::<f32>() - 0.5) * bass * cfg.jitter_x,
                (rng.random::<f32>() - 0.5) * bass * cfg.jitter_y,
            );

            let color = Vec3::new(
                COLOR_BASE + mid * COLOR_SPAN,
                COLOR_BASE + high * COLOR_SPAN,
                COLOR_BASE + bass * COLOR_SPAN,
            );
            let size = SIZE_BASE + high * SIZE_HIGH + energy * SIZE_ENERGY;

            velocity *= cfg.drag;

            if position.x < -cfg.wall_x {
                velocity.x = velocity.x.abs() * cfg.restitution;
                position.x = -cfg.wall_x;
            } else if position.x > cfg.wall_x {
                velocity.x = -velocity.x.abs() * cfg.restitution;
                position.x = cfg.wall_x;
            }

            let life = slot.life - cfg.life_decay * step;

            if position.y < cfg.respawn_floor || life <= 0.0 {
                // Destructive transition: discard all prior state
                *slot = spawn_particle(&mut rng);
                continue;
            }

            *slot = Particle {
                position,
                velocity,
                color,
                size,
                life,
                max_life: slot.max_life,
            };
        }
    }

    /// The configuration this field was built with.
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }
}

impl ParticleSource for ParticleField {
    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn write_vertex_data(&self, out: &mut [f32]) -> usize {
        let count = self.particles.len().min(out.len() / PARTICLE_FLOATS);
        let mut index = 0;
        for particle in &self.particles[..count] {
            out[index] = particle.position.x;
            out[index + 1] = particle.position.y;
            out[index + 2] = particle.color.x;
            out[index + 3] = particle.color.y;
            out[index + 4] = particle.color.z;
            out[index + 5] = particle.size;
            out[index + 6] = particle.life;
            out[index + 7] = particle.max_life;
            index += PARTICLE_FLOATS;
        }
        index
    }
}

/// Fresh randomized particle at the top of the screen, drifting down.
fn spawn_particle(rng: &mut impl Rng) -> Particle {
    Particle {
        position: Vec2::new(
            rng.random::<f32>() * 2.4 - 1.2,
            1.0 + rng.random::<f32>() * 0.5,
        ),
        velocity: Vec2::new(
            (rng.random::<f32>() - 0.5) * 0.002,
            -0.01 - rng.random::<f32>() * 0.01,
        ),
        color: Vec3::new(
            rng.random::<f32>() * 0.7 + 0.3,
            rng.random::<f32>() * 0.7 + 0.3,
            rng.random::<f32>() * 0.7 + 0.3,
        ),
        size: rng.random::<f32>() * 8.0 + 6.0,
        life: 1.0,
        max_life: 1.0,
    }
}
