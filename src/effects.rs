//! Visual feedback: particles, screen shake, screen flash
//!
//! The simulation only calls the spawn/set entry points here; the render
//! pass consumes the state. Nothing in this module feeds back into gameplay.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Dust,
    Sparkle,
    Burst,
}

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// 0-1, decreases every frame
    pub life: f32,
    pub size: f32,
}

/// Frame-synchronized effect state.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub particles: Vec<Particle>,
    /// Camera jitter amplitude in pixels, decays every frame
    pub shake: f32,
    /// Full-screen flash alpha, decays every frame
    pub flash: f32,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Low puff at the player's feet (landing, direction change).
    pub fn spawn_dust(&mut self, pos: Vec2, rng: &mut Pcg32) {
        for _ in 0..6 {
            let vx = rng.random_range(-1.5..1.5);
            let vy = rng.random_range(-1.2..-0.2);
            self.push(Particle {
                pos,
                vel: Vec2::new(vx, vy),
                kind: ParticleKind::Dust,
                life: 1.0,
                size: rng.random_range(2.0..4.0),
            });
        }
    }

    /// Rising glitter (checkpoints, collection).
    pub fn spawn_sparkle(&mut self, pos: Vec2, rng: &mut Pcg32) {
        for _ in 0..12 {
            let vx = rng.random_range(-2.0..2.0);
            let vy = rng.random_range(-3.5..-1.0);
            self.push(Particle {
                pos,
                vel: Vec2::new(vx, vy),
                kind: ParticleKind::Sparkle,
                life: 1.0,
                size: rng.random_range(2.0..5.0),
            });
        }
    }

    /// Radial burst (death, victory).
    pub fn spawn_burst(&mut self, pos: Vec2, rng: &mut Pcg32) {
        for i in 0..24 {
            let theta = i as f32 / 24.0 * std::f32::consts::TAU;
            let speed = rng.random_range(2.0..5.0);
            self.push(Particle {
                pos,
                vel: Vec2::new(theta.cos(), theta.sin()) * speed,
                kind: ParticleKind::Burst,
                life: 1.0,
                size: rng.random_range(3.0..6.0),
            });
        }
    }

    pub fn set_shake(&mut self, amount: f32) {
        self.shake = self.shake.max(amount);
    }

    pub fn set_flash(&mut self, alpha: f32) {
        self.flash = self.flash.max(alpha);
    }

    /// Per-frame update: particle kinematics plus shake/flash decay.
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            // Dust and bursts settle; sparkles keep floating up
            if p.kind != ParticleKind::Sparkle {
                p.vel.y += 0.12;
            }
            p.vel *= 0.96;
            p.life -= 0.03;
        }
        self.particles.retain(|p| p.life > 0.0);

        self.shake *= 0.9;
        if self.shake < 0.01 {
            self.shake = 0.0;
        }
        self.flash *= 0.93;
        if self.flash < 0.01 {
            self.flash = 0.0;
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.shake = 0.0;
        self.flash = 0.0;
    }

    fn push(&mut self, p: Particle) {
        if self.particles.len() < MAX_PARTICLES {
            self.particles.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn particles_expire() {
        let mut fx = Effects::new();
        let mut rng = Pcg32::seed_from_u64(1);
        fx.spawn_dust(Vec2::ZERO, &mut rng);
        assert!(!fx.particles.is_empty());
        for _ in 0..60 {
            fx.update();
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn particle_cap_holds() {
        let mut fx = Effects::new();
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..100 {
            fx.spawn_burst(Vec2::ZERO, &mut rng);
        }
        assert!(fx.particles.len() <= MAX_PARTICLES);
    }

    #[test]
    fn shake_and_flash_decay_to_zero() {
        let mut fx = Effects::new();
        fx.set_shake(10.0);
        fx.set_flash(1.0);
        for _ in 0..120 {
            fx.update();
        }
        assert_eq!(fx.shake, 0.0);
        assert_eq!(fx.flash, 0.0);
    }

    #[test]
    fn set_shake_never_reduces() {
        let mut fx = Effects::new();
        fx.set_shake(8.0);
        fx.set_shake(3.0);
        assert_eq!(fx.shake, 8.0);
    }
}
