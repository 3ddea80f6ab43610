use std::fmt;
use std::time::Duration;

/// Opaque, stable identity of an entity tracked by the host.
///
/// The host owns the mapping from its own identifiers (UUIDs, connection ids)
/// to `EntityId`; the revival pipeline only compares and hashes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u64);

impl EntityId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World position of an entity, including facing.
///
/// `Location` is a plain value: cloning it produces an independent snapshot
/// that is unaffected by later movement of the entity it was read from.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub yaw: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pitch: f32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    /// Returns a copy of this location shifted by the given deltas.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
            ..self.clone()
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:.2}, {:.2}, {:.2})",
            self.world, self.x, self.y, self.z
        )
    }
}

/// One simulation step of the host. Deferred work and effect durations are
/// expressed in ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    /// Host simulation rate.
    pub const PER_SECOND: u64 = 20;

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(Self::PER_SECOND))
    }

    #[must_use]
    pub const fn saturating_add(self, rhs: Tick) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub const fn checked_add(self, rhs: Tick) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

/// Saturates at `u64::MAX` ticks.
impl std::ops::Add<Tick> for Tick {
    type Output = Tick;
    fn add(self, rhs: Tick) -> Tick {
        self.saturating_add(rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t", self.0)
    }
}

/// Absolute wall-clock time in milliseconds, as reported by the host clock.
///
/// Cooldown expiry is compared against this value, so the host clock must be
/// monotonic for cooldowns to behave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_offset_leaves_original_untouched() {
        let origin = Location::new("world", 10.0, 64.0, -3.5).with_rotation(90.0, 0.0);
        let raised = origin.offset(0.0, 1.0, 0.0);

        assert_eq!(origin.y, 64.0);
        assert_eq!(raised.y, 65.0);
        assert_eq!(raised.world, "world");
        assert_eq!(raised.yaw, 90.0);
    }

    #[test]
    fn timestamp_addition_saturates() {
        let near_end = Timestamp(u64::MAX - 10);
        assert_eq!(
            near_end.saturating_add(Duration::from_millis(500)),
            Timestamp(u64::MAX)
        );
        assert_eq!(
            Timestamp(1_000).saturating_add(Duration::from_millis(500)),
            Timestamp(1_500)
        );
    }

    #[test]
    fn tick_conversion_uses_host_rate() {
        assert_eq!(Tick::from_secs(45), Tick(900));
        assert_eq!(Tick::ONE + Tick(2), Tick(3));
    }

    #[test]
    fn tick_addition_saturates() {
        assert_eq!(Tick(u64::MAX - 1) + Tick(5), Tick(u64::MAX));
        assert_eq!(Tick(u64::MAX).checked_add(Tick::ONE), None);
        assert_eq!(Tick(7).checked_add(Tick::ONE), Some(Tick(8)));
        assert_eq!(Tick::from_secs(u64::MAX), Tick(u64::MAX));
    }
}
