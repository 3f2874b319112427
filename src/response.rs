use blueprints_store::{Blueprint, Point};
use serde::{Deserialize, Serialize};

/// Credentials submitted to the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A coordinate as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDto {
    pub x: i32,
    pub y: i32,
}

impl From<Point> for PointDto {
    fn from(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
        }
    }
}

impl From<PointDto> for Point {
    fn from(dto: PointDto) -> Self {
        Point::new(dto.x, dto.y)
    }
}

/// Payload for creating a blueprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlueprintRequest {
    pub author: String,
    pub name: String,
    #[serde(default)]
    pub points: Vec<PointDto>,
}

/// Payload for appending a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPointRequest {
    pub x: i32,
    pub y: i32,
}

/// Blueprint as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintResponse {
    pub id: Option<u64>,
    pub author: String,
    pub name: String,
    pub points: Vec<PointDto>,
    pub points_count: usize,
}

impl From<&Blueprint> for BlueprintResponse {
    fn from(blueprint: &Blueprint) -> Self {
        Self {
            id: blueprint.id().map(|id| id.0),
            author: blueprint.author().to_string(),
            name: blueprint.name().to_string(),
            points: blueprint.points().iter().copied().map(PointDto::from).collect(),
            points_count: blueprint.points_count(),
        }
    }
}

/// A bare message body, e.g. `{"message":"Point added successfully"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Uniform envelope wrapping every blueprint operation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Mirrors the HTTP status code
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_data(200, "execute ok", data)
    }

    pub fn created(data: T) -> Self {
        Self::with_data(201, "resource created", data)
    }

    pub fn accepted(data: T) -> Self {
        Self::with_data(202, "accepted", data)
    }

    pub fn with_data(code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// An error envelope with `data: null`
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}
