use super::Vec2;

/// Planar centroid of a set of polygon rings, weighted by signed area.
///
/// Rings are treated as closed; a repeated closing vertex is ignored. Holes
/// wound opposite to their shell subtract from the total. When the rings
/// enclose no area the centroid falls back to the perimeter midpoint, then
/// to the mean vertex.
pub fn path_centroid<'a, I>(rings: I) -> Option<Vec2>
where
    I: IntoIterator<Item = &'a [Vec2]>,
{
    let mut acc = CentroidAccumulator::default();
    for ring in rings {
        acc.ring(ring);
    }
    acc.result()
}

#[derive(Debug, Default)]
struct CentroidAccumulator {
    // vertex sums
    x0: f64,
    y0: f64,
    z0: f64,
    // perimeter-weighted sums
    x1: f64,
    y1: f64,
    z1: f64,
    // area-weighted sums
    x2: f64,
    y2: f64,
    z2: f64,
}

impl CentroidAccumulator {
    fn ring(&mut self, ring: &[Vec2]) {
        let ring = open_ring(ring);
        let Some(first) = ring.first().copied() else {
            return;
        };
        if !first.is_finite() {
            return;
        }

        self.point(first);
        let mut prev = first;
        for p in ring.iter().skip(1).copied().filter(|p| p.is_finite()) {
            self.segment(prev, p);
            prev = p;
        }
        self.segment(prev, first);
    }

    fn point(&mut self, p: Vec2) {
        self.x0 += p.x;
        self.y0 += p.y;
        self.z0 += 1.0;
    }

    fn segment(&mut self, a: Vec2, b: Vec2) {
        let len = (b - a).length();
        self.x1 += len * (a.x + b.x) * 0.5;
        self.y1 += len * (a.y + b.y) * 0.5;
        self.z1 += len;

        let cross = a.y * b.x - a.x * b.y;
        self.x2 += cross * (a.x + b.x);
        self.y2 += cross * (a.y + b.y);
        self.z2 += cross * 3.0;

        self.point(b);
    }

    fn result(&self) -> Option<Vec2> {
        let c = if self.z2 != 0.0 {
            Vec2::new(self.x2 / self.z2, self.y2 / self.z2)
        } else if self.z1 != 0.0 {
            Vec2::new(self.x1 / self.z1, self.y1 / self.z1)
        } else if self.z0 != 0.0 {
            Vec2::new(self.x0 / self.z0, self.y0 / self.z0)
        } else {
            return None;
        };
        c.is_finite().then_some(c)
    }
}

fn open_ring(ring: &[Vec2]) -> &[Vec2] {
    match ring {
        [first, .., last] if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

#[cfg(test)]
mod tests {
    use super::path_centroid;
    use crate::math::Vec2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Vec2> {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
            Vec2::new(x, y),
        ]
    }

    #[test]
    fn unit_square_centroid() {
        let ring = square(0.0, 0.0, 1.0);
        let c = path_centroid([ring.as_slice()]).unwrap();
        assert_close(c.x, 0.5, 1e-12);
        assert_close(c.y, 0.5, 1e-12);
    }

    #[test]
    fn larger_polygon_dominates() {
        let big = square(0.0, 0.0, 10.0);
        let small = square(100.0, 0.0, 1.0);
        let c = path_centroid([big.as_slice(), small.as_slice()]).unwrap();
        // area 100 at x=5, area 1 at x=100.5
        assert_close(c.x, (100.0 * 5.0 + 100.5) / 101.0, 1e-9);
    }

    #[test]
    fn hole_shifts_centroid_away() {
        let shell = square(0.0, 0.0, 4.0);
        let mut hole = square(0.0, 0.0, 2.0);
        hole.reverse();
        let c = path_centroid([shell.as_slice(), hole.as_slice()]).unwrap();
        assert!(c.x > 2.0 && c.y > 2.0);
    }

    #[test]
    fn degenerate_ring_falls_back_to_perimeter() {
        let line = vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)];
        let c = path_centroid([line.as_slice()]).unwrap();
        assert_close(c.x, 2.0, 1e-12);
        assert_close(c.y, 0.0, 1e-12);
    }

    #[test]
    fn empty_input_has_no_centroid() {
        let rings: Vec<&[Vec2]> = Vec::new();
        assert!(path_centroid(rings).is_none());
    }
}
