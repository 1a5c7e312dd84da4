use super::{FloatType, WorldBox, WorldPoint, WorldVector};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl WorldBox {
    /// Box that contains nothing, min is +inf and max is -inf.
    /// A union with any point or box yields that point or box.
    pub fn empty() -> WorldBox {
        AABB {
            min: WorldPoint::from(WorldVector::repeat(FloatType::INFINITY)),
            max: WorldPoint::from(WorldVector::repeat(FloatType::NEG_INFINITY)),
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn union(&self, other: &WorldBox) -> WorldBox {
        AABB {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn union_point(&self, point: &WorldPoint) -> WorldBox {
        AABB {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    /// Smallest box containing all the points, empty box if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> WorldBox {
        points
            .into_iter()
            .fold(WorldBox::empty(), |acc, p| acc.union_point(p))
    }

    /// Grows the box by `epsilon` along every axis in both directions.
    /// Empty box stays empty.
    pub fn padded(&self, epsilon: FloatType) -> WorldBox {
        if self.is_empty() {
            return *self;
        }
        let padding = WorldVector::repeat(epsilon);
        AABB {
            min: self.min - padding,
            max: self.max + padding,
        }
    }

    /// Returns true if every point of `other` is inside this box (inclusive).
    pub fn contains_box(&self, other: &WorldBox) -> bool {
        other.is_empty()
            || (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }
}

impl Default for WorldBox {
    fn default() -> Self {
        WorldBox::empty()
    }
}
