use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A 2D integer coordinate owned by a blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Storage-assigned surrogate id. Only meaningful to the store that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlueprintId(pub u64);

impl fmt::Display for BlueprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The natural key of a blueprint. All lookups and uniqueness checks go through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlueprintKey {
    pub author: String,
    pub name: String,
}

impl BlueprintKey {
    pub fn new(author: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for BlueprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.author, self.name)
    }
}

/// A named, author-owned, ordered sequence of points.
///
/// Equality and hashing consider only the [`BlueprintKey`]; two values with the
/// same author and name are the same blueprint whatever their id or points.
#[derive(Debug, Clone)]
pub struct Blueprint {
    id: Option<BlueprintId>,
    key: BlueprintKey,
    points: Vec<Point>,
}

impl Blueprint {
    /// A blueprint that has not been stored yet
    pub fn new(author: impl Into<String>, name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            id: None,
            key: BlueprintKey::new(author, name),
            points,
        }
    }

    /// Attach the id assigned by a store
    pub fn with_id(mut self, id: BlueprintId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<BlueprintId> {
        self.id
    }

    pub fn key(&self) -> &BlueprintKey {
        &self.key
    }

    pub fn author(&self) -> &str {
        &self.key.author
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn points_count(&self) -> usize {
        self.points.len()
    }

    /// Append a point at the end of the sequence
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Same blueprint with a different point sequence
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }
}

impl PartialEq for Blueprint {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Blueprint {}

impl Hash for Blueprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
