//! Numeric configuration of the growth engine.
//!
//! [`Settings`] is the complete, validated form every path and shape
//! works with. Hosts usually describe only what they want to change with a
//! [`PartialSettings`] and overlay it on the defaults via
//! [`Settings::merge`]. The bounding rectangle has no meaningful default and
//! is always taken from the partial form.

use crate::{error::GrowthError, geometry::Bounds};
use serde::{Deserialize, Serialize};

/// How the push away from the bounding rectangle is oriented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRepulsion {
    /// `-(closest + position).normalize() * 1.5`. The direction depends on
    /// where the origin lies relative to the bounds.
    #[default]
    Legacy,
    /// `(position - closest).normalize() * 1.5`, pointing away from the
    /// nearest edge.
    Outward,
}

/// Complete configuration for a growth entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Minimum distance between neighbors. Used by attraction, pruning and
    /// injection.
    pub min_distance: f32,
    /// Edges longer than this are split at their midpoint.
    pub max_distance: f32,
    /// Radius of the repulsion query around each vertex, and of the
    /// boundary repulsion zone.
    pub repulsion_radius: f32,
    /// Fraction of the net force applied per step, in `[0, 1]`.
    pub max_velocity: f32,
    pub attraction_force: f32,
    pub repulsion_force: f32,
    pub alignment_force: f32,
    /// Simulated seconds between two random injections.
    pub node_injection_interval: f64,
    /// Number of points an initial contour is resampled into.
    pub sub_splits_number: usize,
    /// Emit `tracing` debug events.
    pub debug_mode: bool,
    pub bounds: Bounds,
    #[serde(default)]
    pub boundary_repulsion: BoundaryRepulsion,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_distance: 1.5,
            max_distance: 6.0,
            repulsion_radius: 17.0,
            max_velocity: 0.1,
            attraction_force: 0.15,
            repulsion_force: 0.8,
            alignment_force: 0.7,
            node_injection_interval: 0.1,
            sub_splits_number: 50,
            debug_mode: false,
            bounds: Bounds::EMPTY,
            boundary_repulsion: BoundaryRepulsion::Legacy,
        }
    }
}

/// Overlay for [`Settings`]: every present field wins over the default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartialSettings {
    #[serde(default)]
    pub min_distance: Option<f32>,
    #[serde(default)]
    pub max_distance: Option<f32>,
    #[serde(default)]
    pub repulsion_radius: Option<f32>,
    #[serde(default)]
    pub max_velocity: Option<f32>,
    #[serde(default)]
    pub attraction_force: Option<f32>,
    #[serde(default)]
    pub repulsion_force: Option<f32>,
    #[serde(default)]
    pub alignment_force: Option<f32>,
    #[serde(default)]
    pub node_injection_interval: Option<f64>,
    #[serde(default)]
    pub sub_splits_number: Option<usize>,
    #[serde(default)]
    pub debug_mode: Option<bool>,
    #[serde(default)]
    pub boundary_repulsion: Option<BoundaryRepulsion>,
    pub bounds: Bounds,
}

impl PartialSettings {
    /// A partial form that only sets the mandatory bounds.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            repulsion_radius: None,
            max_velocity: None,
            attraction_force: None,
            repulsion_force: None,
            alignment_force: None,
            node_injection_interval: None,
            sub_splits_number: None,
            debug_mode: None,
            boundary_repulsion: None,
            bounds,
        }
    }

    /// Parses a TOML document. Missing keys stay `None`; `[bounds]` is
    /// required.
    pub fn from_toml_str(src: &str) -> Result<Self, GrowthError> {
        Ok(toml::from_str(src)?)
    }
}

impl From<Settings> for PartialSettings {
    fn from(s: Settings) -> Self {
        Self {
            min_distance: Some(s.min_distance),
            max_distance: Some(s.max_distance),
            repulsion_radius: Some(s.repulsion_radius),
            max_velocity: Some(s.max_velocity),
            attraction_force: Some(s.attraction_force),
            repulsion_force: Some(s.repulsion_force),
            alignment_force: Some(s.alignment_force),
            node_injection_interval: Some(s.node_injection_interval),
            sub_splits_number: Some(s.sub_splits_number),
            debug_mode: Some(s.debug_mode),
            boundary_repulsion: Some(s.boundary_repulsion),
            bounds: s.bounds,
        }
    }
}

impl Settings {
    /// Overlays `partial` on `self`. Never fails; run [`Settings::validate`]
    /// on the result before using it.
    pub fn merge(&self, partial: &PartialSettings) -> Settings {
        Settings {
            min_distance: partial.min_distance.unwrap_or(self.min_distance),
            max_distance: partial.max_distance.unwrap_or(self.max_distance),
            repulsion_radius: partial.repulsion_radius.unwrap_or(self.repulsion_radius),
            max_velocity: partial.max_velocity.unwrap_or(self.max_velocity),
            attraction_force: partial.attraction_force.unwrap_or(self.attraction_force),
            repulsion_force: partial.repulsion_force.unwrap_or(self.repulsion_force),
            alignment_force: partial.alignment_force.unwrap_or(self.alignment_force),
            node_injection_interval: partial
                .node_injection_interval
                .unwrap_or(self.node_injection_interval),
            sub_splits_number: partial.sub_splits_number.unwrap_or(self.sub_splits_number),
            debug_mode: partial.debug_mode.unwrap_or(self.debug_mode),
            boundary_repulsion: partial
                .boundary_repulsion
                .unwrap_or(self.boundary_repulsion),
            bounds: partial.bounds,
        }
    }

    /// Merges `partial` over [`Settings::default`] and validates the result.
    pub fn from_partial(partial: &PartialSettings) -> Result<Settings, GrowthError> {
        let settings = Settings::default().merge(partial);
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects configurations that would make the simulation produce
    /// non-finite or meaningless geometry.
    pub fn validate(&self) -> Result<(), GrowthError> {
        let finite_f32 = [
            ("min_distance", self.min_distance),
            ("max_distance", self.max_distance),
            ("repulsion_radius", self.repulsion_radius),
            ("max_velocity", self.max_velocity),
            ("attraction_force", self.attraction_force),
            ("repulsion_force", self.repulsion_force),
            ("alignment_force", self.alignment_force),
        ];
        for (name, value) in finite_f32 {
            if !value.is_finite() {
                return Err(invalid(name, value as f64, "must be finite"));
            }
        }
        if !self.node_injection_interval.is_finite() {
            return Err(invalid(
                "node_injection_interval",
                self.node_injection_interval,
                "must be finite",
            ));
        }

        if self.min_distance < 0.0 {
            return Err(invalid("min_distance", self.min_distance as f64, "must be >= 0"));
        }
        if self.max_distance <= 0.0 {
            return Err(invalid("max_distance", self.max_distance as f64, "must be > 0"));
        }
        if self.max_distance <= self.min_distance {
            return Err(invalid(
                "max_distance",
                self.max_distance as f64,
                "must be greater than min_distance",
            ));
        }
        if self.repulsion_radius <= 0.0 {
            return Err(invalid(
                "repulsion_radius",
                self.repulsion_radius as f64,
                "must be > 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.max_velocity) {
            return Err(invalid(
                "max_velocity",
                self.max_velocity as f64,
                "must be within [0, 1]",
            ));
        }
        for (name, value) in [
            ("attraction_force", self.attraction_force),
            ("repulsion_force", self.repulsion_force),
            ("alignment_force", self.alignment_force),
        ] {
            if value < 0.0 {
                return Err(invalid(name, value as f64, "must be >= 0"));
            }
        }
        if self.node_injection_interval < 0.0 {
            return Err(invalid(
                "node_injection_interval",
                self.node_injection_interval,
                "must be >= 0",
            ));
        }
        if self.sub_splits_number == 0 {
            return Err(invalid("sub_splits_number", 0.0, "must be > 0"));
        }
        if self.bounds.is_empty() {
            return Err(GrowthError::EmptyBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> GrowthError {
    GrowthError::InvalidSetting {
        name,
        value,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds() -> Bounds {
        Bounds::new(0.0, 0.0, 500.0, 500.0)
    }

    #[test]
    fn merge_with_nothing_present_keeps_defaults_but_takes_bounds() {
        let merged = Settings::default().merge(&PartialSettings::new(bounds()));
        let expected = Settings {
            bounds: bounds(),
            ..Settings::default()
        };
        assert_eq!(merged, expected);
    }

    #[test]
    fn merge_overrides_present_fields_only() {
        let partial = PartialSettings {
            max_distance: Some(12.0),
            repulsion_force: Some(0.6),
            sub_splits_number: Some(60),
            debug_mode: Some(true),
            ..PartialSettings::new(bounds())
        };
        let merged = Settings::default().merge(&partial);

        assert_eq!(merged.max_distance, 12.0);
        assert_eq!(merged.repulsion_force, 0.6);
        assert_eq!(merged.sub_splits_number, 60);
        assert!(merged.debug_mode);
        assert_eq!(merged.min_distance, 1.5);
        assert_eq!(merged.alignment_force, 0.7);
        assert_eq!(merged.boundary_repulsion, BoundaryRepulsion::Legacy);
    }

    #[test]
    fn complete_settings_round_trip_through_partial() {
        let settings = Settings {
            min_distance: 0.25,
            sub_splits_number: 7,
            boundary_repulsion: BoundaryRepulsion::Outward,
            bounds: bounds(),
            ..Settings::default()
        };
        let partial = PartialSettings::from(settings);
        assert_eq!(Settings::default().merge(&partial), settings);
    }

    #[test]
    fn defaults_with_bounds_validate() {
        assert!(Settings::from_partial(&PartialSettings::new(bounds())).is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad = |partial: PartialSettings| Settings::from_partial(&partial).unwrap_err();

        assert!(matches!(
            bad(PartialSettings::new(Bounds::EMPTY)),
            GrowthError::EmptyBounds { .. }
        ));
        assert!(matches!(
            bad(PartialSettings {
                sub_splits_number: Some(0),
                ..PartialSettings::new(bounds())
            }),
            GrowthError::InvalidSetting {
                name: "sub_splits_number",
                ..
            }
        ));
        assert!(matches!(
            bad(PartialSettings {
                min_distance: Some(-1.0),
                ..PartialSettings::new(bounds())
            }),
            GrowthError::InvalidSetting {
                name: "min_distance",
                ..
            }
        ));
        assert!(matches!(
            bad(PartialSettings {
                max_distance: Some(1.0),
                min_distance: Some(2.0),
                ..PartialSettings::new(bounds())
            }),
            GrowthError::InvalidSetting {
                name: "max_distance",
                ..
            }
        ));
        assert!(matches!(
            bad(PartialSettings {
                repulsion_force: Some(f32::NAN),
                ..PartialSettings::new(bounds())
            }),
            GrowthError::InvalidSetting {
                name: "repulsion_force",
                ..
            }
        ));
        assert!(matches!(
            bad(PartialSettings {
                max_velocity: Some(1.5),
                ..PartialSettings::new(bounds())
            }),
            GrowthError::InvalidSetting {
                name: "max_velocity",
                ..
            }
        ));
    }

    #[test]
    fn parses_toml_overlay() {
        let src = r#"
            max_distance = 8.8
            repulsion_radius = 12.0
            sub_splits_number = 120
            boundary_repulsion = "outward"

            [bounds]
            x = 50.0
            y = 50.0
            width = 980.0
            height = 980.0
        "#;
        let partial = PartialSettings::from_toml_str(src).unwrap();
        assert_eq!(partial.max_distance, Some(8.8));
        assert_eq!(partial.min_distance, None);
        assert_eq!(partial.boundary_repulsion, Some(BoundaryRepulsion::Outward));

        let settings = Settings::from_partial(&partial).unwrap();
        assert_eq!(settings.sub_splits_number, 120);
        assert_eq!(settings.bounds, Bounds::new(50.0, 50.0, 980.0, 980.0));
        assert_eq!(settings.attraction_force, 0.15);
    }

    #[test]
    fn toml_without_bounds_is_an_error() {
        let err = PartialSettings::from_toml_str("min_distance = 1.0").unwrap_err();
        assert!(matches!(err, GrowthError::Config(_)));
    }

    proptest! {
        #[test]
        fn merge_is_total_and_field_wise(
            min_distance in proptest::option::of(-10.0f32..10.0),
            max_distance in proptest::option::of(-10.0f32..10.0),
            max_velocity in proptest::option::of(0.0f32..2.0),
            interval in proptest::option::of(0.0f64..5.0),
            splits in proptest::option::of(0usize..500),
            debug in proptest::option::of(any::<bool>()),
        ) {
            let defaults = Settings::default();
            let partial = PartialSettings {
                min_distance,
                max_distance,
                max_velocity,
                node_injection_interval: interval,
                sub_splits_number: splits,
                debug_mode: debug,
                ..PartialSettings::new(bounds())
            };
            let merged = defaults.merge(&partial);

            prop_assert_eq!(merged.min_distance, min_distance.unwrap_or(defaults.min_distance));
            prop_assert_eq!(merged.max_distance, max_distance.unwrap_or(defaults.max_distance));
            prop_assert_eq!(merged.max_velocity, max_velocity.unwrap_or(defaults.max_velocity));
            prop_assert_eq!(
                merged.node_injection_interval,
                interval.unwrap_or(defaults.node_injection_interval)
            );
            prop_assert_eq!(merged.sub_splits_number, splits.unwrap_or(defaults.sub_splits_number));
            prop_assert_eq!(merged.debug_mode, debug.unwrap_or(defaults.debug_mode));
            prop_assert_eq!(merged.repulsion_radius, defaults.repulsion_radius);
            prop_assert_eq!(merged.bounds, bounds());
            // Validation never panics either, whatever the merge produced.
            let _ = merged.validate();
        }
    }
}
