//! # Geometry Module
//!
//! Planar primitives shared by placement, routing and validation.
//!
//! Dungeon space is a 2D canvas with `x` growing east and `y` growing south,
//! so a room's NORTH edge is its top edge. World space is the 3D frame the
//! instantiation collaborator builds in; see [`WorldPoint`].

use serde::{Deserialize, Serialize};

/// Distance below which two points are treated as the same point.
pub const POINT_EPSILON: f32 = 0.1;

/// Represents a 2D coordinate in dungeon space.
///
/// # Examples
///
/// ```
/// use gauntlet::Vec2;
///
/// let a = Vec2::new(0.0, 0.0);
/// let b = Vec2::new(3.0, 4.0);
/// assert_eq!(a.distance(b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Creates a new point with the given coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns true if both points are within [`POINT_EPSILON`] of each other.
    pub fn approx_eq(self, other: Vec2) -> bool {
        self.distance(other) < POINT_EPSILON
    }

    /// Moves this point `distance` units along a cardinal direction.
    pub fn offset(self, direction: Direction, distance: f32) -> Vec2 {
        let (dx, dy) = direction.to_delta();
        Vec2::new(self.x + dx as f32 * distance, self.y + dy as f32 * distance)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// A position in the instantiation collaborator's 3D world.
///
/// Dungeon `x` maps to world `x`, dungeon `y` maps to world `z`, and every
/// dungeon tile sits at the origin's `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the world origin (0, 0, 0).
    pub fn origin() -> Self {
        Self::default()
    }
}

/// Axis-aligned rectangle in dungeon space, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a square of side `size` centred on `center`.
    pub fn centered(center: Vec2, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    /// Returns the rectangle inflated by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Checks if this rectangle overlaps another.
    ///
    /// Rectangles that only share an edge do not overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use gauntlet::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
    /// let crossing = Rect::new(9.0, 9.0, 10.0, 10.0);
    /// assert!(!a.overlaps(&touching));
    /// assert!(a.overlaps(&crossing));
    /// ```
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Checks if a point lies inside the rectangle (left/top edges inclusive).
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Area shared with another rectangle, zero when they do not overlap.
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        if !self.overlaps(other) {
            return 0.0;
        }
        let width = self.right().min(other.right()) - self.x.max(other.x);
        let height = self.bottom().min(other.bottom()) - self.y.max(other.y);
        width * height
    }
}

/// Cardinal directions a room can be entered or exited by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions, in clockwise order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Converts a direction to a unit step in dungeon space.
    ///
    /// # Examples
    ///
    /// ```
    /// use gauntlet::Direction;
    ///
    /// assert_eq!(Direction::North.to_delta(), (0, -1));
    /// assert_eq!(Direction::East.to_delta(), (1, 0));
    /// ```
    pub fn to_delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// True for EAST and WEST.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    /// Upper-case name used in logs and tile metadata.
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
