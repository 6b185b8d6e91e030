use std::f64::consts::FRAC_PI_4;

use super::Vec2;

/// Maps geographic degrees to planar pixel space and back.
pub trait Projection {
    fn project(&self, lon_lat_deg: [f64; 2]) -> Option<Vec2>;
    fn invert(&self, point: Vec2) -> Option<[f64; 2]>;
}

/// Pixel viewport a projection is fitted to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width_px: 980.0,
            height_px: 551.0,
            scale: 210.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width_px * 0.5, self.height_px * 0.5)
    }
}

/// John Muir's Times projection, translated to the viewport center.
///
/// Planar y grows downward (screen convention).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimesProjection {
    translate: Vec2,
    scale: f64,
}

impl TimesProjection {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            translate: viewport.center(),
            scale: viewport.scale,
        }
    }
}

impl Default for TimesProjection {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl Projection for TimesProjection {
    fn project(&self, lon_lat_deg: [f64; 2]) -> Option<Vec2> {
        let (x, y) = times_raw(lon_lat_deg[0].to_radians(), lon_lat_deg[1].to_radians());
        let p = Vec2::new(
            self.translate.x + self.scale * x,
            self.translate.y - self.scale * y,
        );
        p.is_finite().then_some(p)
    }

    fn invert(&self, point: Vec2) -> Option<[f64; 2]> {
        if self.scale == 0.0 {
            return None;
        }
        let x = (point.x - self.translate.x) / self.scale;
        let y = (self.translate.y - point.y) / self.scale;
        let (lambda, phi) = times_raw_invert(x, y);
        let out = [lambda.to_degrees(), phi.to_degrees()];
        (out[0].is_finite() && out[1].is_finite()).then_some(out)
    }
}

fn times_raw(lambda: f64, phi: f64) -> (f64, f64) {
    let t = (phi * 0.5).tan();
    let s = (FRAC_PI_4 * t).sin();
    (lambda * (0.74482 - 0.34588 * s * s), 1.70711 * t)
}

fn times_raw_invert(x: f64, y: f64) -> (f64, f64) {
    let t = y / 1.70711;
    let s = (FRAC_PI_4 * t).sin();
    (x / (0.74482 - 0.34588 * s * s), 2.0 * t.atan())
}
