/// Light - data block carried by LIGHT nodes.
///
/// Position and direction come from the owning node's world matrix when the
/// scene collects render state: a light shines along the node's forward
/// axis (-Z). Directional lights that cast shadows get their shadow
/// cascades fitted to the main camera's frustum at collection time.

use glam::Vec3;

const SOURCE: &str = "nova3d::Light";

/// Cascade counts accepted for directional shadows.
pub const MAX_SHADOW_CASCADES: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LightType {
    Ambient = 0,
    Directional = 1,
    Point = 2,
    Spot = 3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    light_type: LightType,
    color: Vec3,
    intensity: f32,
    /// Attenuation range for point and spot lights, shadow extent for
    /// directional lights
    range: f32,
    /// Inner cone angle in radians
    spot_angle: f32,
    spot_softness: f32,
    cast_shadows: bool,
    shadow_bias: f32,
    cascade_count: u32,
    split_lambda: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self::ambient()
    }
}

impl Light {
    pub fn ambient() -> Self {
        Self {
            light_type: LightType::Ambient,
            color: Vec3::ONE,
            intensity: 0.1,
            range: 0.0,
            spot_angle: 0.0,
            spot_softness: 0.0,
            cast_shadows: false,
            shadow_bias: 0.005,
            cascade_count: 1,
            split_lambda: 0.5,
        }
    }

    pub fn directional() -> Self {
        Self {
            light_type: LightType::Directional,
            intensity: 1.0,
            range: 100.0,
            ..Self::ambient()
        }
    }

    pub fn point(range: f32) -> Self {
        Self {
            light_type: LightType::Point,
            intensity: 1.0,
            range,
            ..Self::ambient()
        }
    }

    pub fn spot(angle_radians: f32, range: f32) -> Self {
        Self {
            light_type: LightType::Spot,
            intensity: 1.0,
            range,
            spot_angle: angle_radians,
            spot_softness: 0.2,
            ..Self::ambient()
        }
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.set_intensity(intensity);
        self
    }

    /// Enable shadows with `cascade_count` cascades split with `lambda`
    /// (0 = uniform, 1 = logarithmic). Cascades only apply to directional
    /// lights; other types use one shadow map.
    pub fn with_shadows(mut self, cascade_count: u32, lambda: f32) -> Self {
        self.set_cast_shadows(true);
        self.set_cascades(cascade_count, lambda);
        self
    }

    // ===== GETTERS =====

    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn spot_angle(&self) -> f32 {
        self.spot_angle
    }

    pub fn spot_softness(&self) -> f32 {
        self.spot_softness
    }

    /// Ambient lights never cast shadows.
    pub fn casts_shadows(&self) -> bool {
        self.cast_shadows && self.light_type != LightType::Ambient
    }

    pub fn shadow_bias(&self) -> f32 {
        self.shadow_bias
    }

    pub fn cascade_count(&self) -> u32 {
        self.cascade_count
    }

    pub fn split_lambda(&self) -> f32 {
        self.split_lambda
    }

    // ===== SETTERS =====

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        if !(intensity >= 0.0 && intensity.is_finite()) {
            crate::engine_warn!(SOURCE, "Ignoring light intensity {}", intensity);
            return;
        }
        self.intensity = intensity;
    }

    pub fn set_range(&mut self, range: f32) {
        if !(range > 0.0 && range.is_finite()) {
            crate::engine_warn!(SOURCE, "Ignoring light range {}", range);
            return;
        }
        self.range = range;
    }

    pub fn set_cast_shadows(&mut self, cast_shadows: bool) {
        if cast_shadows && self.light_type == LightType::Ambient {
            crate::engine_warn!(SOURCE, "Ambient lights cannot cast shadows");
            return;
        }
        self.cast_shadows = cast_shadows;
    }

    pub fn set_shadow_bias(&mut self, bias: f32) {
        self.shadow_bias = bias;
    }

    /// Count is clamped to 1..=`MAX_SHADOW_CASCADES`, lambda to [0, 1].
    pub fn set_cascades(&mut self, count: u32, lambda: f32) {
        let clamped = count.clamp(1, MAX_SHADOW_CASCADES);
        if clamped != count {
            crate::engine_warn!(SOURCE, "Cascade count {} clamped to {}", count, clamped);
        }
        self.cascade_count = clamped;
        if lambda.is_finite() {
            self.split_lambda = lambda.clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
