//! Cart-pole dynamics.
//!
//! The model follows the frictionless formulation of Barto, Sutton and
//! Anderson (1983) used by most reinforcement learning benchmarks.

use serde::{Deserialize, Serialize};

use crate::PhysicsError;

/// Number of components in a cart-pole state vector.
pub const STATE_DIM: usize = 4;

/// Configuration for a cart-pole system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartPoleConfig {
    /// Gravitational acceleration in m/s^2
    pub gravity: f32,
    /// Cart mass in kg
    pub cart_mass: f32,
    /// Pole mass in kg
    pub pole_mass: f32,
    /// Half of the pole length in meters
    pub pole_half_length: f32,
    /// Force magnitude applied to the cart on every step
    pub force_magnitude: f32,
    /// Seconds between state updates
    pub tau: f32,
    /// Angle threshold for failure detection (radians)
    pub failure_angle: f32,
    /// Position threshold for failure detection (meters)
    pub position_limit: f32,
    /// Half-width of the uniform distribution every state component is drawn from on reset
    pub reset_noise: f32,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            cart_mass: 1.0,
            pole_mass: 0.1,
            pole_half_length: 0.5,
            force_magnitude: 10.0,
            tau: 0.02,
            failure_angle: 12.0_f32.to_radians(),
            position_limit: 2.4,
            reset_noise: 0.05,
        }
    }
}

impl CartPoleConfig {
    /// Check that every physical quantity is usable by the integrator.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let positive = [
            ("gravity", self.gravity),
            ("cart_mass", self.cart_mass),
            ("pole_mass", self.pole_mass),
            ("pole_half_length", self.pole_half_length),
            ("force_magnitude", self.force_magnitude),
            ("tau", self.tau),
            ("failure_angle", self.failure_angle),
            ("position_limit", self.position_limit),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::InvalidConfig {
                    field,
                    requirement: "finite and positive",
                    value,
                });
            }
        }
        if !(self.reset_noise.is_finite() && self.reset_noise >= 0.0) {
            return Err(PhysicsError::InvalidConfig {
                field: "reset_noise",
                requirement: "finite and non-negative",
                value: self.reset_noise,
            });
        }
        Ok(())
    }

    fn total_mass(&self) -> f32 {
        self.cart_mass + self.pole_mass
    }

    fn pole_mass_length(&self) -> f32 {
        self.pole_mass * self.pole_half_length
    }
}

/// Direction of the force applied to the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Push {
    Left,
    Right,
}

impl Push {
    fn sign(self) -> f32 {
        match self {
            Push::Left => -1.0,
            Push::Right => 1.0,
        }
    }
}

/// Kinematic state of the cart and pole.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CartPoleState {
    pub cart_x: f32,
    pub cart_velocity: f32,
    pub pole_angle: f32,
    pub pole_angular_velocity: f32,
}

impl CartPoleState {
    /// State vector `[cart_x, cart_velocity, pole_angle, pole_angular_velocity]`.
    #[must_use]
    pub fn to_array(&self) -> [f32; STATE_DIM] {
        [
            self.cart_x,
            self.cart_velocity,
            self.pole_angle,
            self.pole_angular_velocity,
        ]
    }
}

/// A single cart-pole system with its own random source for resets.
pub struct CartPole {
    config: CartPoleConfig,
    state: CartPoleState,
    rng: fastrand::Rng,
    /// Whether the cartpole has failed (fallen over or out of bounds)
    pub failed: bool,
}

impl CartPole {
    /// Create a new cart-pole at rest in the upright position.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`CartPoleConfig::validate`].
    pub fn new(config: CartPoleConfig, seed: u64) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            state: CartPoleState::default(),
            rng: fastrand::Rng::with_seed(seed),
            failed: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &CartPoleConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> CartPoleState {
        self.state
    }

    /// Reset to a slightly perturbed upright state and return its state vector.
    pub fn reset(&mut self) -> [f32; STATE_DIM] {
        self.failed = false;
        let noise = self.config.reset_noise;
        let sample = || (self.rng.f32() * 2.0 - 1.0) * noise;
        self.state = CartPoleState {
            cart_x: sample(),
            cart_velocity: sample(),
            pole_angle: sample(),
            pole_angular_velocity: sample(),
        };
        self.state.to_array()
    }

    /// Push the cart and advance the simulation by one time step.
    pub fn apply_force(&mut self, push: Push) {
        let c = &self.config;
        let force = push.sign() * c.force_magnitude;
        let CartPoleState {
            cart_x,
            cart_velocity,
            pole_angle,
            pole_angular_velocity,
        } = self.state;

        let (sin_theta, cos_theta) = pole_angle.sin_cos();
        let temp = (force
            + c.pole_mass_length() * pole_angular_velocity * pole_angular_velocity * sin_theta)
            / c.total_mass();
        let angular_acc = (c.gravity * sin_theta - cos_theta * temp)
            / (c.pole_half_length
                * (4.0 / 3.0 - c.pole_mass * cos_theta * cos_theta / c.total_mass()));
        let cart_acc = temp - c.pole_mass_length() * angular_acc * cos_theta / c.total_mass();

        self.state = CartPoleState {
            cart_x: cart_x + c.tau * cart_velocity,
            cart_velocity: cart_velocity + c.tau * cart_acc,
            pole_angle: pole_angle + c.tau * pole_angular_velocity,
            pole_angular_velocity: pole_angular_velocity + c.tau * angular_acc,
        };
    }

    /// Check if the cartpole has failed (fallen over or out of bounds)
    pub fn check_failure(&mut self) -> bool {
        if self.failed {
            return true;
        }
        let out_of_track = self.state.cart_x.abs() > self.config.position_limit;
        let fallen = self.state.pole_angle.abs() > self.config.failure_angle;
        self.failed = out_of_track || fallen;
        self.failed
    }
}
