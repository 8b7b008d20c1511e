// Geometry kernel: the only collision primitives the simulation uses.

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Strict interior test; points on the edge are outside.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x + self.w && y > self.y && y < self.y + self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

/// Closest-point projection of the circle center onto the rectangle.
pub fn circle_intersects_rect(circle: Circle, rect: &Rect) -> bool {
    let test_x = circle.x.max(rect.x).min(rect.x + rect.w);
    let test_y = circle.y.max(rect.y).min(rect.y + rect.h);
    let dx = circle.x - test_x;
    let dy = circle.y - test_y;
    dx * dx + dy * dy < circle.r * circle.r
}

/// Separating-axis test with `padding` applied symmetrically around `b`.
pub fn rects_overlap(a: &Rect, b: &Rect, padding: f32) -> bool {
    !(b.x - padding > a.x + a.w
        || b.x + b.w + padding < a.x
        || b.y - padding > a.y + a.h
        || b.y + b.h + padding < a.y)
}

pub fn circle_hits_any(circle: Circle, obstacles: &[Rect]) -> bool {
    obstacles
        .iter()
        .any(|rect| circle_intersects_rect(circle, rect))
}

pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (ax - bx).hypot(ay - by)
}
