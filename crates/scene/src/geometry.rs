#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.lon_deg, self.lat_deg]
    }
}

pub type Ring = Vec<GeoPoint>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Polygon,
    MultiPolygon,
}

/// Area geometry of a map entity.
///
/// A "coordinate group" is the top-level unit of the coordinate array: a
/// ring for `Polygon`, a whole polygon for `MultiPolygon`. Territory
/// decomposition moves runs of groups between entities.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GroupRangeError {
    pub start: usize,
    pub count: usize,
    pub available: usize,
}

impl std::fmt::Display for GroupRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "coordinate groups {}..{} out of range ({} available)",
            self.start,
            self.start.saturating_add(self.count),
            self.available
        )
    }
}

impl std::error::Error for GroupRangeError {}

impl Default for AreaGeometry {
    fn default() -> Self {
        AreaGeometry::MultiPolygon(Vec::new())
    }
}

impl AreaGeometry {
    pub fn kind(&self) -> AreaKind {
        match self {
            AreaGeometry::Polygon(_) => AreaKind::Polygon,
            AreaGeometry::MultiPolygon(_) => AreaKind::MultiPolygon,
        }
    }

    pub fn group_count(&self) -> usize {
        match self {
            AreaGeometry::Polygon(rings) => rings.len(),
            AreaGeometry::MultiPolygon(polys) => polys.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group_count() == 0
    }

    /// Moves `count` groups starting at `start` out of `self` into a new
    /// geometry of the same kind. Nothing is moved when the range is empty or
    /// runs past the end.
    pub fn take_groups(
        &mut self,
        start: usize,
        count: usize,
    ) -> Result<AreaGeometry, GroupRangeError> {
        let available = self.group_count();
        let end = start.checked_add(count);
        if count == 0 || end.is_none_or(|end| end > available) {
            return Err(GroupRangeError {
                start,
                count,
                available,
            });
        }
        let range = start..start + count;
        Ok(match self {
            AreaGeometry::Polygon(rings) => AreaGeometry::Polygon(rings.drain(range).collect()),
            AreaGeometry::MultiPolygon(polys) => {
                AreaGeometry::MultiPolygon(polys.drain(range).collect())
            }
        })
    }

    /// Each polygon as a slice of rings (outer ring first).
    pub fn polygons(&self) -> Vec<&[Ring]> {
        match self {
            AreaGeometry::Polygon(rings) => vec![rings.as_slice()],
            AreaGeometry::MultiPolygon(polys) => polys.iter().map(|p| p.as_slice()).collect(),
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        self.polygons().into_iter().flat_map(|p| p.iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.rings().map(|r| r.len()).sum()
    }
}
