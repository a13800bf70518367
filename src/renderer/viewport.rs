//! Letterboxed mapping between the playfield and the canvas

use glam::Vec2;

use crate::sim::state::Playfield;

/// Fits the playfield inside a viewport while preserving its aspect ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Viewport size in pixels
    pub viewport: Vec2,
    pub field: Vec2,
    /// Fraction of each NDC axis the playfield occupies
    scale: Vec2,
}

impl Letterbox {
    pub fn new(viewport_width: f32, viewport_height: f32, field: &Playfield) -> Self {
        let viewport = Vec2::new(viewport_width.max(1.0), viewport_height.max(1.0));
        let field = Vec2::new(field.width, field.height);

        let viewport_aspect = viewport.x / viewport.y;
        let field_aspect = field.x / field.y;
        let scale = if viewport_aspect > field_aspect {
            // Bars left and right
            Vec2::new(field_aspect / viewport_aspect, 1.0)
        } else {
            Vec2::new(1.0, viewport_aspect / field_aspect)
        };

        Self {
            viewport,
            field,
            scale,
        }
    }

    /// Playfield pixels (y down) to normalized device coordinates (y up)
    pub fn to_ndc(&self, p: Vec2) -> Vec2 {
        let half = self.field / 2.0;
        let centered = (p - half) / half;
        Vec2::new(centered.x * self.scale.x, -centered.y * self.scale.y)
    }

    /// Canvas pixels to playfield pixels; `None` when outside the playfield
    pub fn to_field(&self, canvas: Vec2) -> Option<Vec2> {
        let ndc = Vec2::new(
            canvas.x / self.viewport.x * 2.0 - 1.0,
            1.0 - canvas.y / self.viewport.y * 2.0,
        );
        let centered = Vec2::new(ndc.x / self.scale.x, -ndc.y / self.scale.y);
        if centered.x.abs() > 1.0 || centered.y.abs() > 1.0 {
            return None;
        }
        let half = self.field / 2.0;
        Some(centered * half + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_aspect_fills_viewport() {
        let lb = Letterbox::new(800.0, 600.0, &Playfield::default());
        assert_eq!(lb.to_ndc(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(lb.to_ndc(Vec2::new(800.0, 600.0)), Vec2::new(1.0, -1.0));
        assert_eq!(lb.to_field(Vec2::new(400.0, 300.0)), Some(Vec2::new(400.0, 300.0)));
    }

    #[test]
    fn test_wide_viewport_pillarboxes() {
        // 1600x600 viewport, 800x600 field: field covers the middle half
        let lb = Letterbox::new(1600.0, 600.0, &Playfield::default());
        assert_eq!(lb.to_ndc(Vec2::new(0.0, 300.0)), Vec2::new(-0.5, 0.0));
        assert_eq!(lb.to_field(Vec2::new(100.0, 300.0)), None);
        let p = lb.to_field(Vec2::new(800.0, 300.0)).unwrap();
        assert!((p - Vec2::new(400.0, 300.0)).length() < 1e-3);
    }
}
