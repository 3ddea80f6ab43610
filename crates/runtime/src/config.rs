//! Revival tuning: what qualifies, how long the cooldown lasts, and what a
//! successful revival applies.
use std::env;
use std::time::Duration;

use game_core::{
    ItemKind, Particle, ParticleCue, Sound, SoundCue, StatusEffect, StatusEffectKind, Tick,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevivalConfig {
    /// Item whose presence in either hand arms a revival.
    pub qualifying_item: ItemKind,
    /// Window after a revival during which lethal damage is not tracked.
    #[serde(with = "millis")]
    pub cooldown: Duration,
    /// Steps between the death event and the forced respawn.
    pub respawn_delay: Tick,
    /// Steps between the respawn event and applying the revival effects.
    pub effect_delay: Tick,
    /// Health the entity is left with after revival.
    pub revival_health: f64,
    /// Effects removed and then reapplied on revival, in order.
    pub effects: Vec<StatusEffect>,
    pub sound: SoundCue,
    pub particles: ParticleCue,
}

impl RevivalConfig {
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);
    pub const DEFAULT_REVIVAL_HEALTH: f64 = 1.0;

    /// Upper bound for the respawn and effect delays read from the
    /// environment (one minute of host time).
    pub const MAX_DELAY: Tick = Tick::from_secs(60);

    /// Regeneration II (45s), Absorption II (5s), Fire Resistance (40s).
    pub const DEFAULT_EFFECTS: [StatusEffect; 3] = [
        StatusEffect::new(StatusEffectKind::Regeneration, Tick(900), 1),
        StatusEffect::new(StatusEffectKind::Absorption, Tick(100), 1),
        StatusEffect::new(StatusEffectKind::FireResistance, Tick(800), 0),
    ];

    pub const DEFAULT_SOUND: SoundCue = SoundCue::new(Sound::ItemTotemUse, 1.0, 1.0);

    pub const DEFAULT_PARTICLES: ParticleCue =
        ParticleCue::new(Particle::TotemOfUndying, 50, [0.5, 0.5, 0.5], 0.1).raised(1.0);

    pub fn new() -> Self {
        Self {
            qualifying_item: ItemKind::TotemOfUndying,
            cooldown: Self::DEFAULT_COOLDOWN,
            respawn_delay: Tick::ONE,
            effect_delay: Tick::ONE,
            revival_health: Self::DEFAULT_REVIVAL_HEALTH,
            effects: Self::DEFAULT_EFFECTS.to_vec(),
            sound: Self::DEFAULT_SOUND,
            particles: Self::DEFAULT_PARTICLES,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TOTEM_COOLDOWN_MS` - Re-detection cooldown after a revival (default: 500)
    /// - `TOTEM_RESPAWN_DELAY_TICKS` - Steps before the forced respawn (default: 1, max: 1200)
    /// - `TOTEM_EFFECT_DELAY_TICKS` - Steps before effects are applied (default: 1, max: 1200)
    /// - `TOTEM_REVIVAL_HEALTH` - Health after revival (default: 1.0)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = read_var::<u64, _>(&lookup, "TOTEM_COOLDOWN_MS") {
            config.cooldown = Duration::from_millis(ms);
        }

        if let Some(ticks) = read_var::<u64, _>(&lookup, "TOTEM_RESPAWN_DELAY_TICKS") {
            config.respawn_delay = clamp_delay(ticks);
        }

        if let Some(ticks) = read_var::<u64, _>(&lookup, "TOTEM_EFFECT_DELAY_TICKS") {
            config.effect_delay = clamp_delay(ticks);
        }

        if let Some(health) = read_var::<f64, _>(&lookup, "TOTEM_REVIVAL_HEALTH")
            && health > 0.0
        {
            config.revival_health = health;
        }

        config
    }
}

impl Default for RevivalConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_delay(ticks: u64) -> Tick {
    Tick(ticks).clamp(Tick::ONE, RevivalConfig::MAX_DELAY)
}

fn read_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)?.trim().parse().ok()
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_mirror_vanilla_totem() {
        let config = RevivalConfig::default();

        assert_eq!(config.qualifying_item, ItemKind::TotemOfUndying);
        assert_eq!(config.cooldown, Duration::from_millis(500));
        assert_eq!(config.revival_health, 1.0);
        assert_eq!(config.effects.len(), 3);
        assert_eq!(config.effects[0].duration, Tick::from_secs(45));
        assert_eq!(config.effects[0].level(), 2);
        assert_eq!(config.particles.count, 50);
        assert_eq!(config.particles.height, 1.0);
    }

    #[test]
    fn lookup_overrides_and_ignores_garbage() {
        let config = RevivalConfig::from_lookup(lookup(&[
            ("TOTEM_COOLDOWN_MS", "1200"),
            ("TOTEM_RESPAWN_DELAY_TICKS", "0"),
            ("TOTEM_EFFECT_DELAY_TICKS", "three"),
            ("TOTEM_REVIVAL_HEALTH", "-4"),
        ]));

        assert_eq!(config.cooldown, Duration::from_millis(1200));
        assert_eq!(config.respawn_delay, Tick(1));
        assert_eq!(config.effect_delay, Tick(1));
        assert_eq!(config.revival_health, 1.0);
    }

    #[test]
    fn lookup_caps_delays() {
        let max = u64::MAX.to_string();
        let config = RevivalConfig::from_lookup(lookup(&[
            ("TOTEM_RESPAWN_DELAY_TICKS", max.as_str()),
            ("TOTEM_EFFECT_DELAY_TICKS", "40"),
        ]));

        assert_eq!(config.respawn_delay, RevivalConfig::MAX_DELAY);
        assert_eq!(config.respawn_delay, Tick(1200));
        assert_eq!(config.effect_delay, Tick(40));
    }
}
