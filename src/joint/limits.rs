use glam::Vec3;

/// Default bound on every axis when a limit is left unspecified (degrees)
pub const DEFAULT_LIMIT_DEGREES: f32 = 180.0;

/// Per-axis rotation bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for JointLimits {
    fn default() -> Self {
        Self {
            min: Vec3::splat(-DEFAULT_LIMIT_DEGREES),
            max: Vec3::splat(DEFAULT_LIMIT_DEGREES),
        }
    }
}

impl JointLimits {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Clamp each component into `[min, max]`.
    ///
    /// Applied as max-then-min so inverted bounds resolve to `max` instead of
    /// panicking. NaN components pass through unchanged.
    #[inline]
    pub fn clamp(&self, angles: Vec3) -> Vec3 {
        Vec3::select(angles.is_nan_mask(), angles, angles.max(self.min).min(self.max))
    }

    /// Whether clamping changed any non-NaN component of `requested`
    #[inline]
    pub fn is_limited(requested: Vec3, applied: Vec3) -> bool {
        (requested.cmpne(applied) & !requested.is_nan_mask()).any()
    }
}

/// A pose assignment that was clamped by a joint's limits.
#[derive(Debug, Clone, Copy)]
pub struct LimitHit<'a> {
    pub joint: &'a str,
    pub requested: Vec3,
    pub applied: Vec3,
}

impl LimitHit<'_> {
    /// Axes whose requested value was changed, as `(axis, requested, applied)`.
    pub fn clamped_axes(&self) -> impl Iterator<Item = (char, f32, f32)> + '_ {
        ['X', 'Y', 'Z']
            .into_iter()
            .enumerate()
            .filter(|&(i, _)| self.requested[i] != self.applied[i])
            .map(|(i, axis)| (axis, self.requested[i], self.applied[i]))
    }
}

/// Observability hook for limit hits.
///
/// Called once when a joint goes from unclamped to clamped; consecutive
/// clamped assignments are not reported again until the joint leaves the
/// limited state.
pub trait LimitObserver {
    fn on_limit_hit(&mut self, hit: &LimitHit<'_>);
}

/// Reports limit hits through `log::debug!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLimitObserver;

impl LimitObserver for LogLimitObserver {
    fn on_limit_hit(&mut self, hit: &LimitHit<'_>) {
        let axes: Vec<String> = hit
            .clamped_axes()
            .map(|(axis, requested, applied)| format!("{}({}->{})", axis, requested, applied))
            .collect();
        log::debug!("[limit reached] {}: {}", hit.joint, axes.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_componentwise() {
        let limits = JointLimits::new(Vec3::new(-10.0, 0.0, -90.0), Vec3::new(10.0, 45.0, 90.0));
        let clamped = limits.clamp(Vec3::new(-30.0, 60.0, 12.5));
        assert_eq!(clamped, Vec3::new(-10.0, 45.0, 12.5));
    }

    #[test]
    fn test_inverted_limits_resolve_to_max() {
        let limits = JointLimits::new(Vec3::splat(10.0), Vec3::splat(-10.0));
        assert_eq!(limits.clamp(Vec3::ZERO), Vec3::splat(-10.0));
    }

    #[test]
    fn test_clamp_passes_nan_through() {
        let limits = JointLimits::new(Vec3::new(-150.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        let clamped = limits.clamp(Vec3::new(f32::NAN, 20.0, 0.0));
        assert!(clamped.x.is_nan());
        assert_eq!(clamped.y, 0.0);
        assert!(!JointLimits::is_limited(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::new(f32::NAN, 0.0, 0.0)));
        assert!(JointLimits::is_limited(Vec3::new(f32::NAN, 20.0, 0.0), clamped));
    }

    #[test]
    fn test_clamped_axes_lists_only_changes() {
        let hit = LimitHit {
            joint: "knee_l",
            requested: Vec3::new(200.0, 0.0, -5.0),
            applied: Vec3::new(150.0, 0.0, 0.0),
        };
        let axes: Vec<_> = hit.clamped_axes().collect();
        assert_eq!(axes, vec![('X', 200.0, 150.0), ('Z', -5.0, 0.0)]);
    }
}
