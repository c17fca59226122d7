use serde::{Deserialize, Serialize};

use crate::{boid::Boid, math_helpers::SimVector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidState<V> {
    pub position: V,
    pub velocity: V,
}

impl<V: SimVector> From<&Boid<V>> for BoidState<V> {
    fn from(boid: &Boid<V>) -> Self {
        BoidState {
            position: boid.position,
            velocity: boid.velocity,
        }
    }
}

/// One boid on the wire. `z` and `vz` only exist for spatial flocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireBoid {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    pub vx: f32,
    pub vy: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vz: Option<f32>,
}

impl<V: SimVector> From<&BoidState<V>> for WireBoid {
    fn from(state: &BoidState<V>) -> Self {
        let spatial = V::DIM > 2;
        WireBoid {
            x: state.position.axis(0),
            y: state.position.axis(1),
            z: spatial.then(|| state.position.axis(2)),
            vx: state.velocity.axis(0),
            vy: state.velocity.axis(1),
            vz: spatial.then(|| state.velocity.axis(2)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireFlock {
    pub boids: Vec<WireBoid>,
}

impl<V: SimVector> From<&[BoidState<V>]> for WireFlock {
    fn from(states: &[BoidState<V>]) -> Self {
        WireFlock {
            boids: states.iter().map(WireBoid::from).collect(),
        }
    }
}

/// `{"boids":[{"x":..,"y":..,"vx":..,"vy":..}, ..]}`, in flock order.
pub fn to_json<V: SimVector>(states: &[BoidState<V>]) -> serde_json::Result<String> {
    serde_json::to_string(&WireFlock::from(states))
}
