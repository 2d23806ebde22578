use std::collections::HashSet;

use bracket_geometry::prelude::Point;

/// The set of tiles the player can currently see.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FovMap {
    visible: HashSet<Point>,
}

impl FovMap {
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        Self {
            visible: points.into_iter().collect(),
        }
    }

    pub fn is_in_fov(&self, point: Point) -> bool {
        self.visible.contains(&point)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.visible.iter()
    }
}
