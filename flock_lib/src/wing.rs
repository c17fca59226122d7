use rand::Rng;

const UPPER_MAX_DEG: f32 = 67.5;
const UPPER_STEP_DEG: f32 = 6.;
const LOWER_STEP_DEG: f32 = 8.;
const BODY_HEIGHT_DIVISOR: f32 = 15.;

/// Wing flapping phase of a boid, advanced once per moving tick.
///
/// The upper wing swings between 0° and 67.5° while the lower wing follows it
/// from -45° to 45°, the body bobs with the lower wing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingBeat {
    pub upper_angle: f32,
    pub lower_angle: f32,
    pub body_height: f32,
    pub rising: bool,
}

impl Default for WingBeat {
    fn default() -> Self {
        WingBeat {
            upper_angle: 0.,
            lower_angle: -45.,
            body_height: 0.,
            rising: true,
        }
    }
}

impl WingBeat {
    /// Random phase so the flock does not flap in unison.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let upper_angle = rng.gen::<f32>() * UPPER_MAX_DEG;
        let lower_angle = (upper_angle / UPPER_MAX_DEG) * 90. - 45.;

        WingBeat {
            upper_angle,
            lower_angle,
            body_height: lower_angle / BODY_HEIGHT_DIVISOR,
            rising: upper_angle < UPPER_MAX_DEG / 2.,
        }
    }

    pub fn advance(&mut self) {
        if self.rising {
            self.upper_angle += UPPER_STEP_DEG;
            self.lower_angle += LOWER_STEP_DEG;
            if self.upper_angle >= UPPER_MAX_DEG {
                self.rising = false;
            }
        } else {
            self.upper_angle -= UPPER_STEP_DEG;
            self.lower_angle -= LOWER_STEP_DEG;
            if self.upper_angle <= 0. {
                self.rising = true;
            }
        }
        self.body_height = self.lower_angle / BODY_HEIGHT_DIVISOR;
    }
}
