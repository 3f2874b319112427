use blueprints_config::FilterKind;

use crate::model::Blueprint;

/// Transformation applied to blueprints returned by read operations.
///
/// Filters only shape what callers see; stored data is never modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlueprintsFilter {
    /// Returns the blueprint unchanged
    #[default]
    Identity,
    /// Removes consecutive duplicate points
    Redundancy,
    /// Keeps every other point, starting with the first
    Undersampling,
}

impl BlueprintsFilter {
    pub fn apply(&self, blueprint: Blueprint) -> Blueprint {
        match self {
            BlueprintsFilter::Identity => blueprint,
            BlueprintsFilter::Redundancy => {
                let mut points = blueprint.points().to_vec();
                points.dedup();
                blueprint.with_points(points)
            }
            BlueprintsFilter::Undersampling => {
                let points = blueprint.points().iter().step_by(2).copied().collect();
                blueprint.with_points(points)
            }
        }
    }
}

impl From<FilterKind> for BlueprintsFilter {
    fn from(kind: FilterKind) -> Self {
        match kind {
            FilterKind::Identity => BlueprintsFilter::Identity,
            FilterKind::Redundancy => BlueprintsFilter::Redundancy,
            FilterKind::Undersampling => BlueprintsFilter::Undersampling,
        }
    }
}
