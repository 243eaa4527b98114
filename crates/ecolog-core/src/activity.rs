//! Eco activity records and their impact metrics.
//!
//! An [`EcoActivity`] is an immutable-after-creation record of one logged
//! sustainability action. The only field that ever changes after creation
//! is the `synced` flag, flipped once the record has been persisted
//! remotely. Everything the progress engine derives (XP, totals) comes
//! from the four impact metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Domain category of a logged action.
///
/// Pure tag -- presentation data (icons, colors) lives with the UI layer,
/// not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Meals,
    Transport,
    Plastic,
    Energy,
    Water,
    Lifestyle,
    Other,
}

impl ActivityCategory {
    /// All categories, in display order.
    pub const ALL: [ActivityCategory; 7] = [
        ActivityCategory::Meals,
        ActivityCategory::Transport,
        ActivityCategory::Plastic,
        ActivityCategory::Energy,
        ActivityCategory::Water,
        ActivityCategory::Lifestyle,
        ActivityCategory::Other,
    ];

    /// Stable string tag used in storage columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Meals => "meals",
            ActivityCategory::Transport => "transport",
            ActivityCategory::Plastic => "plastic",
            ActivityCategory::Energy => "energy",
            ActivityCategory::Water => "water",
            ActivityCategory::Lifestyle => "lifestyle",
            ActivityCategory::Other => "other",
        }
    }

    /// Parse a storage tag back into a category.
    pub fn from_str_tag(tag: &str) -> Option<Self> {
        match tag {
            "meals" => Some(ActivityCategory::Meals),
            "transport" => Some(ActivityCategory::Transport),
            "plastic" => Some(ActivityCategory::Plastic),
            "energy" => Some(ActivityCategory::Energy),
            "water" => Some(ActivityCategory::Water),
            "lifestyle" => Some(ActivityCategory::Lifestyle),
            "other" => Some(ActivityCategory::Other),
            _ => None,
        }
    }
}

/// The four environmental impact metrics of an activity, all non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ImpactMetrics {
    /// Carbon saved, in kilograms.
    pub carbon_kg: f64,
    /// Water saved, in liters.
    pub water_liters: f64,
    /// Land use saved, in square meters.
    pub land_m2: f64,
    /// Plastic items avoided.
    pub plastic_items: f64,
}

impl ImpactMetrics {
    pub fn new(carbon_kg: f64, water_liters: f64, land_m2: f64, plastic_items: f64) -> Self {
        Self {
            carbon_kg,
            water_liters,
            land_m2,
            plastic_items,
        }
    }

    /// Reject negative or non-finite metrics at the boundary. NaN and
    /// infinities would otherwise poison every comparison downstream.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("carbon_kg", self.carbon_kg),
            ("water_liters", self.water_liters),
            ("land_m2", self.land_m2),
            ("plastic_items", self.plastic_items),
        ];
        for (metric, value) in fields {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteMetric { metric });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeMetric { metric, value });
            }
        }
        Ok(())
    }

    /// Experience points earned by these metrics.
    ///
    /// `carbon * 10 + water * 0.01 + plastic * 5`. Land, duration, distance
    /// and category contribute nothing.
    pub fn points(&self) -> f64 {
        self.carbon_kg * 10.0 + self.water_liters * 0.01 + self.plastic_items * 5.0
    }

    /// Fold another set of metrics into this one.
    pub fn accumulate(&mut self, other: &ImpactMetrics) {
        self.carbon_kg += other.carbon_kg;
        self.water_liters += other.water_liters;
        self.land_m2 += other.land_m2;
        self.plastic_items += other.plastic_items;
    }
}

/// One logged sustainability action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcoActivity {
    pub id: Uuid,
    /// Owning user profile.
    pub owner_id: Uuid,
    pub category: ActivityCategory,
    pub description: String,
    pub notes: Option<String>,
    pub metrics: ImpactMetrics,
    /// Transport distance, if applicable (kilometers).
    pub distance_km: Option<f64>,
    /// Activity duration, if applicable (minutes).
    pub duration_min: Option<u32>,
    /// Reference to an attached photo, if any.
    pub photo_path: Option<String>,
    pub logged_at: DateTime<Utc>,
    /// Whether this record has been persisted remotely.
    pub synced: bool,
}

impl EcoActivity {
    /// Create a new activity record, validating metrics at the boundary.
    pub fn new(
        owner_id: Uuid,
        category: ActivityCategory,
        description: impl Into<String>,
        metrics: ImpactMetrics,
        logged_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        metrics.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            category,
            description: description.into(),
            notes: None,
            metrics,
            distance_km: None,
            duration_min: None,
            photo_path: None,
            logged_at,
            synced: false,
        })
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_distance(mut self, distance_km: f64) -> Self {
        self.distance_km = Some(distance_km);
        self
    }

    pub fn with_duration(mut self, duration_min: u32) -> Self {
        self.duration_min = Some(duration_min);
        self
    }

    pub fn with_photo(mut self, path: impl Into<String>) -> Self {
        self.photo_path = Some(path.into());
        self
    }

    /// Flip the sync flag. The one permitted mutation after creation.
    pub fn mark_synced(&mut self) {
        self.synced = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_points_formula() {
        let metrics = ImpactMetrics::new(2.0, 100.0, 5.0, 3.0);
        // 2*10 + 100*0.01 + 3*5 = 20 + 1 + 15
        assert_eq!(metrics.points(), 36.0);
    }

    #[test]
    fn test_land_contributes_no_points() {
        let metrics = ImpactMetrics::new(0.0, 0.0, 500.0, 0.0);
        assert_eq!(metrics.points(), 0.0);
    }

    #[test]
    fn test_negative_metric_rejected() {
        let metrics = ImpactMetrics::new(-1.0, 0.0, 0.0, 0.0);
        let err = metrics.validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NegativeMetric {
                metric: "carbon_kg",
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_metric_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let metrics = ImpactMetrics::new(0.0, bad, 0.0, 0.0);
            let err = metrics.validate().unwrap_err();
            assert!(matches!(
                err,
                ValidationError::NonFiniteMetric {
                    metric: "water_liters"
                }
            ));
        }
    }

    #[test]
    fn test_new_activity_validates_metrics() {
        let result = EcoActivity::new(
            owner(),
            ActivityCategory::Plastic,
            "Refused a plastic bag",
            ImpactMetrics::new(0.0, 0.0, 0.0, -2.0),
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_accumulate() {
        let mut totals = ImpactMetrics::default();
        totals.accumulate(&ImpactMetrics::new(1.0, 10.0, 2.0, 1.0));
        totals.accumulate(&ImpactMetrics::new(0.5, 5.0, 0.0, 2.0));
        assert_eq!(totals.carbon_kg, 1.5);
        assert_eq!(totals.water_liters, 15.0);
        assert_eq!(totals.land_m2, 2.0);
        assert_eq!(totals.plastic_items, 3.0);
    }

    #[test]
    fn test_category_tag_round_trip() {
        for category in ActivityCategory::ALL {
            assert_eq!(
                ActivityCategory::from_str_tag(category.as_str()),
                Some(category)
            );
        }
        assert_eq!(ActivityCategory::from_str_tag("bogus"), None);
    }

    #[test]
    fn test_distance_and_duration_set_independently() {
        let base = EcoActivity::new(
            owner(),
            ActivityCategory::Transport,
            "walked instead of driving",
            ImpactMetrics::new(0.5, 0.0, 0.0, 0.0),
            Utc::now(),
        )
        .unwrap();
        let distance_only = base.clone().with_distance(3.2);
        assert_eq!(distance_only.distance_km, Some(3.2));
        assert_eq!(distance_only.duration_min, None);
        let duration_only = base.with_duration(40);
        assert_eq!(duration_only.distance_km, None);
        assert_eq!(duration_only.duration_min, Some(40));
    }

    #[test]
    fn test_mark_synced() {
        let mut activity = EcoActivity::new(
            owner(),
            ActivityCategory::Meals,
            "Vegetarian lunch",
            ImpactMetrics::new(1.2, 300.0, 1.0, 0.0),
            Utc::now(),
        )
        .unwrap();
        assert!(!activity.synced);
        activity.mark_synced();
        assert!(activity.synced);
    }
}
