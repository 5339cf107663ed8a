use std::{sync::Arc, time::Duration};

use rand::Rng;
use tracing::debug;

use crate::{ShellController, ShellEvent};

pub(crate) const PARTICLE_COUNT: usize = 140;
pub(crate) const EFFECT_DURATION: Duration = Duration::from_millis(2200);
pub(crate) const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Fraction of a trigger element that must become visible before it fires.
pub(crate) const TRIGGER_THRESHOLD: f32 = 0.4;
pub(crate) const PALETTE: [&str; 5] = ["#8ef6ff", "#ffc857", "#7dd87d", "#ff8fab", "#9b8cff"];

/// One element of the current fragment marked as a particle trigger. Fires
/// at most once for its lifetime; the whole set is rebuilt on every load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticleTrigger {
    triggered: bool,
}

impl ParticleTrigger {
    pub fn triggered(&self) -> bool {
        self.triggered
    }

    pub(crate) fn mark_triggered(&mut self) {
        self.triggered = true;
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub vx: f32,
    pub vy: f32,
    pub rotation: f32,
    pub spin: f32,
    pub color: &'static str,
}

impl Particle {
    fn spawn(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        Self {
            x: rng.random::<f32>() * width,
            y: -(rng.random::<f32>() * height * 0.3),
            size: 6.0 + rng.random::<f32>() * 8.0,
            vx: (rng.random::<f32>() - 0.5) * 4.0,
            vy: 3.0 + rng.random::<f32>() * 4.0,
            rotation: rng.random::<f32>() * std::f32::consts::TAU,
            spin: (rng.random::<f32>() - 0.5) * 0.25,
            color: PALETTE[rng.random_range(0..PALETTE.len())],
        }
    }
}

/// The lazily created drawing surface. Unlike the content region it is
/// never destroyed across fragment loads, only resized and cleared.
#[derive(Debug)]
pub struct ParticleSurface {
    width: u32,
    height: u32,
    particles: Vec<Particle>,
}

impl ParticleSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            particles: Vec::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn populate(&mut self, rng: &mut impl Rng) {
        let width = self.width as f32;
        let height = self.height as f32;
        self.particles = (0..PARTICLE_COUNT)
            .map(|_| Particle::spawn(rng, width, height))
            .collect();
    }

    /// One animation frame: advance every particle, wrapping any that fell
    /// past the bottom edge back above the top at a random x.
    pub(crate) fn advance(&mut self, rng: &mut impl Rng) {
        let width = self.width as f32;
        let height = self.height as f32;
        for particle in &mut self.particles {
            particle.x += particle.vx;
            particle.y += particle.vy;
            particle.rotation += particle.spin;
            if particle.y > height {
                particle.y = -20.0;
                particle.x = rng.random::<f32>() * width;
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.particles.clear();
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConfettiState {
    pub(crate) surface: Option<ParticleSurface>,
    pub(crate) running: bool,
}

impl ShellController {
    /// Viewport-visibility report for one particle trigger of the current
    /// fragment. The first crossing of the threshold fires the effect;
    /// later crossings for the same element are ignored for its lifetime.
    pub async fn report_trigger_visibility(self: &Arc<Self>, index: usize, visible_ratio: f32) {
        if visible_ratio < TRIGGER_THRESHOLD {
            return;
        }
        {
            let mut inner = self.inner.lock().await;
            let Some(trigger) = inner.content.particle_triggers_mut().get_mut(index) else {
                return;
            };
            if trigger.triggered() {
                return;
            }
            trigger.mark_triggered();
        }
        self.start_confetti().await;
    }

    /// Resize the drawing surface to track the viewport. No-op until a
    /// first effect run has created the surface.
    pub async fn resize_surface(&self) {
        let (width, height) = self.viewport.size();
        let mut inner = self.inner.lock().await;
        if let Some(surface) = inner.confetti.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    async fn start_confetti(self: &Arc<Self>) {
        {
            let mut inner = self.inner.lock().await;
            if inner.confetti.running {
                debug!("particle effect already running");
                return;
            }
            inner.confetti.running = true;

            let (width, height) = self.viewport.size();
            let surface = inner
                .confetti
                .surface
                .get_or_insert_with(|| ParticleSurface::new(width, height));
            surface.resize(width, height);
            let mut rng = rand::rng();
            surface.populate(&mut rng);
        }
        let _ = self.events.send(ShellEvent::ConfettiStarted);

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let mut frames = tokio::time::interval(FRAME_INTERVAL);
            frames.tick().await;
            while started.elapsed() < EFFECT_DURATION {
                frames.tick().await;
                let mut inner = controller.inner.lock().await;
                if let Some(surface) = inner.confetti.surface.as_mut() {
                    let mut rng = rand::rng();
                    surface.advance(&mut rng);
                }
            }
            let mut inner = controller.inner.lock().await;
            if let Some(surface) = inner.confetti.surface.as_mut() {
                surface.clear();
            }
            inner.confetti.running = false;
            drop(inner);
            let _ = controller.events.send(ShellEvent::ConfettiFinished);
        });
    }
}

#[cfg(test)]
#[path = "tests/confetti_tests.rs"]
mod tests;
