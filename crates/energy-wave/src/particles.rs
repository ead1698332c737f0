//! Particle System: a fixed pool of particles advected by the field.
//!
//! The pool is filled once and never grows or shrinks. A particle that
//! outlives its lifespan or drifts past the margin around the surface is
//! respawned in place.

use energy_wave_core::{Dimensions, FieldSource, Surface, Xorshift64};
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::palette;

/// Tunables for the particle pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    pub count: usize,
    /// Lifespan range in frames, `[min, max)`.
    pub lifespan_min: u32,
    pub lifespan_max: u32,
    /// Per-particle responsiveness range, `[min, max)`.
    pub speed_factor_min: f64,
    pub speed_factor_max: f64,
    /// Share of the old velocity kept each frame.
    pub velocity_retention: f64,
    /// Share of `field * speed_factor` blended in each frame.
    pub field_gain: f64,
    /// Out-of-bounds tolerance around the surface, CSS px.
    pub margin: f64,
    /// Respawn shares for the top/bottom and left/right edges. The rest
    /// respawn inside the surface.
    pub horizontal_edge_fraction: f64,
    pub vertical_edge_fraction: f64,
    /// How far outside the edge an edge spawn may land, CSS px.
    pub edge_jitter: f64,
    /// Fraction of the lifespan spent fading in and fading out.
    pub fade_in: f64,
    pub fade_out: f64,
    /// Speed (px/frame) at which particles reach full brightness.
    pub full_brightness_speed: f64,
    pub max_alpha: f64,
    /// Trail length as a multiple of velocity.
    pub trail: f64,
    pub base_width: f64,
    pub bright_width: f64,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: 600,
            lifespan_min: 200,
            lifespan_max: 480,
            speed_factor_min: 0.5,
            speed_factor_max: 1.5,
            velocity_retention: 0.9,
            field_gain: 0.2,
            margin: 50.0,
            horizontal_edge_fraction: 0.3,
            vertical_edge_fraction: 0.3,
            edge_jitter: 20.0,
            fade_in: 0.1,
            fade_out: 0.2,
            full_brightness_speed: 4.0,
            max_alpha: 0.85,
            trail: 2.5,
            base_width: 0.6,
            bright_width: 1.4,
        }
    }
}

/// Where a particle's current life started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnOrigin {
    /// Scattered at startup.
    Initial,
    /// Just outside the top or bottom edge.
    HorizontalEdge,
    /// Just outside the left or right edge.
    VerticalEdge,
    /// Anywhere inside the surface.
    Interior,
}

impl SpawnOrigin {
    pub fn is_edge(self) -> bool {
        matches!(self, SpawnOrigin::HorizontalEdge | SpawnOrigin::VerticalEdge)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// CSS pixels, surface-local.
    pub position: DVec2,
    /// Pixels per frame.
    pub velocity: DVec2,
    pub age: u32,
    pub lifespan: u32,
    pub speed_factor: f64,
    pub origin: SpawnOrigin,
}

impl Particle {
    /// Past its lifespan or outside the margin band.
    pub fn is_retired(&self, dimensions: Dimensions, margin: f64) -> bool {
        self.age > self.lifespan || !dimensions.contains_with_margin(self.position, margin)
    }

    /// Fade-in times fade-out, in [0, 1].
    pub fn envelope(&self, fade_in: f64, fade_out: f64) -> f64 {
        let life = f64::from(self.lifespan.max(1));
        let t = (f64::from(self.age) / life).clamp(0.0, 1.0);
        let ramp = |x: f64, span: f64| if span > 0.0 { (x / span).min(1.0) } else { 1.0 };
        ramp(t, fade_in) * ramp(1.0 - t, fade_out)
    }

    /// Speed relative to `full_speed`, clamped to 1.
    pub fn brightness(&self, full_speed: f64) -> f64 {
        if full_speed <= 0.0 {
            return 1.0;
        }
        (self.velocity.length() / full_speed).min(1.0)
    }
}

/// Draws a respawn position from the mixed edge/interior distribution.
pub fn spawn_position(
    rng: &mut Xorshift64,
    dimensions: Dimensions,
    params: &ParticleParams,
) -> (DVec2, SpawnOrigin) {
    let Dimensions { width, height } = dimensions;
    let roll = rng.next_f64();
    let outside = |rng: &mut Xorshift64, side: f64| {
        let jitter = rng.next_range(0.0, params.edge_jitter);
        if rng.chance(0.5) {
            -jitter
        } else {
            side + jitter
        }
    };
    if roll < params.horizontal_edge_fraction {
        let x = rng.next_range(0.0, width);
        let y = outside(rng, height);
        (DVec2::new(x, y), SpawnOrigin::HorizontalEdge)
    } else if roll < params.horizontal_edge_fraction + params.vertical_edge_fraction {
        let x = outside(rng, width);
        let y = rng.next_range(0.0, height);
        (DVec2::new(x, y), SpawnOrigin::VerticalEdge)
    } else {
        let p = DVec2::new(rng.next_range(0.0, width), rng.next_range(0.0, height));
        (p, SpawnOrigin::Interior)
    }
}

/// Fixed-size particle pool.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    params: ParticleParams,
    rng: Xorshift64,
    respawns: u64,
}

impl ParticleSystem {
    /// Fills the pool uniformly across the surface with staggered ages.
    pub fn new(dimensions: Dimensions, params: ParticleParams, seed: u64) -> Self {
        let mut rng = Xorshift64::new(seed);
        let particles = (0..params.count)
            .map(|_| {
                let lifespan = rng.next_u32_in(params.lifespan_min, params.lifespan_max);
                Particle {
                    position: DVec2::new(
                        rng.next_range(0.0, dimensions.width),
                        rng.next_range(0.0, dimensions.height),
                    ),
                    velocity: DVec2::ZERO,
                    age: rng.next_u32_in(0, lifespan),
                    lifespan,
                    speed_factor: rng.next_range(params.speed_factor_min, params.speed_factor_max),
                    origin: SpawnOrigin::Initial,
                }
            })
            .collect();
        Self {
            particles,
            params,
            rng,
            respawns: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn params(&self) -> &ParticleParams {
        &self.params
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Total respawns since construction.
    pub fn respawns(&self) -> u64 {
        self.respawns
    }

    /// Advances every particle by one frame.
    ///
    /// A particle already retired on entry (e.g. after the surface shrank) is
    /// respawned and skips this frame's motion. Otherwise it is advected and
    /// aged, and respawned immediately if that retired it.
    pub fn update<F: FieldSource + ?Sized>(&mut self, field: &F, dimensions: Dimensions, time: f64) {
        let params = self.params;
        for particle in &mut self.particles {
            if particle.is_retired(dimensions, params.margin) {
                respawn(particle, &mut self.rng, dimensions, &params);
                self.respawns += 1;
                continue;
            }
            let force = field.sample(particle.position, time);
            particle.velocity = particle.velocity * params.velocity_retention
                + force * particle.speed_factor * params.field_gain;
            particle.position += particle.velocity;
            particle.age += 1;
            if particle.is_retired(dimensions, params.margin) {
                respawn(particle, &mut self.rng, dimensions, &params);
                self.respawns += 1;
            }
        }
    }

    /// Strokes each visible particle as a short trail behind it. A particle
    /// whose trail is shorter than its width is filled as a dot instead.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let p = &self.params;
        for particle in &self.particles {
            let brightness = particle.brightness(p.full_brightness_speed);
            let alpha = particle.envelope(p.fade_in, p.fade_out)
                * (0.35 + 0.65 * brightness)
                * p.max_alpha;
            if alpha < 0.01 {
                continue;
            }
            let color = palette::PARTICLE_COOL
                .lerp(palette::PARTICLE_HOT, brightness)
                .with_alpha(alpha);
            let width = p.base_width + p.bright_width * brightness;
            let trail = particle.velocity * p.trail;
            if trail.length() < width {
                surface.fill_circle(particle.position, width * 0.5, color);
            } else {
                surface.stroke_polyline(&[particle.position - trail, particle.position], color, width);
            }
        }
    }
}

fn respawn(
    particle: &mut Particle,
    rng: &mut Xorshift64,
    dimensions: Dimensions,
    params: &ParticleParams,
) {
    let (position, origin) = spawn_position(rng, dimensions, params);
    particle.position = position;
    particle.origin = origin;
    particle.velocity = DVec2::ZERO;
    particle.age = 0;
    particle.lifespan = rng.next_u32_in(params.lifespan_min, params.lifespan_max);
    particle.speed_factor = rng.next_range(params.speed_factor_min, params.speed_factor_max);
}
