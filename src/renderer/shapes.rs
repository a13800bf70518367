//! Shape generation for 2D primitives
//!
//! Everything is emitted as triangle lists in playfield pixels.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, with_alpha};
use crate::sim::state::TrailPoint;

fn push_tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        push_tri(
            &mut vertices,
            center,
            center + Vec2::from_angle(theta1) * radius,
            center + Vec2::from_angle(theta2) * radius,
            color,
        );
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let dir1 = Vec2::from_angle((i as f32 / segments as f32) * 2.0 * PI);
        let dir2 = Vec2::from_angle(((i + 1) as f32 / segments as f32) * 2.0 * PI);

        let inner1 = center + dir1 * inner_radius;
        let outer1 = center + dir1 * outer_radius;
        let inner2 = center + dir2 * inner_radius;
        let outer2 = center + dir2 * outer_radius;

        // Two triangles per segment
        push_tri(&mut vertices, inner1, outer1, inner2, color);
        push_tri(&mut vertices, inner2, outer1, outer2, color);
    }

    vertices
}

/// Fan-triangulated polygon. `outline` is in local space around `center` and
/// must be star-shaped from the origin.
pub fn polygon(center: Vec2, outline: &[Vec2], rotation: f32, color: [f32; 4]) -> Vec<Vertex> {
    if outline.len() < 3 {
        return Vec::new();
    }
    let rot = Vec2::from_angle(rotation);
    let mut vertices = Vec::with_capacity(outline.len() * 3);

    for i in 0..outline.len() {
        let a = center + rot.rotate(outline[i]);
        let b = center + rot.rotate(outline[(i + 1) % outline.len()]);
        push_tri(&mut vertices, center, a, b, color);
    }

    vertices
}

/// Axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_tri(&mut vertices, min, Vec2::new(max.x, min.y), max, color);
    push_tri(&mut vertices, min, max, Vec2::new(min.x, max.y), color);
    vertices
}

/// Thick line segment
pub fn segment(a: Vec2, b: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    let perp = dir.perp() * (thickness / 2.0);
    let mut vertices = Vec::with_capacity(6);
    push_tri(&mut vertices, a + perp, a - perp, b + perp, color);
    push_tri(&mut vertices, b + perp, a - perp, b - perp, color);
    vertices
}

/// Engine plume from trail samples (newest first). Width and alpha come from
/// the samples themselves.
pub fn engine_trail(trail: &[TrailPoint], color: [f32; 4]) -> Vec<Vertex> {
    if trail.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity(trail.len() * 6);
    for pair in trail.windows(2) {
        let (p1, p2) = (&pair[0], &pair[1]);
        if p2.alpha <= 0.0 {
            break;
        }

        let color1 = with_alpha(color, p1.alpha * 0.6);
        let color2 = with_alpha(color, p2.alpha * 0.6);

        // Samples mostly stack vertically; fall back to a horizontal spread
        let dir = (p2.pos - p1.pos).try_normalize().unwrap_or(Vec2::Y);
        let perp = dir.perp();

        let v1a = p1.pos + perp * (p1.width / 2.0);
        let v1b = p1.pos - perp * (p1.width / 2.0);
        let v2a = p2.pos + perp * (p2.width / 2.0);
        let v2b = p2.pos - perp * (p2.width / 2.0);

        vertices.push(Vertex::new(v1a.x, v1a.y, color1));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2a.x, v2a.y, color2));

        vertices.push(Vertex::new(v2a.x, v2a.y, color2));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2b.x, v2b.y, color2));
    }

    vertices
}

/// Seven-segment masks for 0-9, bit 0 = top, then clockwise, bit 6 = middle
const DIGIT_SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// Width of one digit relative to its height
const DIGIT_ASPECT: f32 = 0.5;
/// Gap between digits relative to height
const DIGIT_GAP: f32 = 0.2;

/// Total width of a rendered number
pub fn number_width(value: u32, height: f32) -> f32 {
    let digits = value.to_string().len() as f32;
    digits * height * DIGIT_ASPECT + (digits - 1.0) * height * DIGIT_GAP
}

/// Seven-segment number centered on `center`
pub fn number(value: u32, center: Vec2, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let text = value.to_string();
    let width = height * DIGIT_ASPECT;
    let thickness = (height * 0.14).max(1.0);
    let mut origin = center - Vec2::new(number_width(value, height) / 2.0, height / 2.0);

    let mut vertices = Vec::new();
    for ch in text.bytes() {
        let mask = DIGIT_SEGMENTS[(ch - b'0') as usize];
        let (w, h, h2) = (width, height, height / 2.0);
        let strokes = [
            (Vec2::new(0.0, 0.0), Vec2::new(w, 0.0)),
            (Vec2::new(w, 0.0), Vec2::new(w, h2)),
            (Vec2::new(w, h2), Vec2::new(w, h)),
            (Vec2::new(0.0, h), Vec2::new(w, h)),
            (Vec2::new(0.0, h2), Vec2::new(0.0, h)),
            (Vec2::new(0.0, 0.0), Vec2::new(0.0, h2)),
            (Vec2::new(0.0, h2), Vec2::new(w, h2)),
        ];
        for (bit, (a, b)) in strokes.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                vertices.extend(segment(origin + *a, origin + *b, thickness, color));
            }
        }
        origin.x += width + height * DIGIT_GAP;
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        assert_eq!(circle(Vec2::ZERO, 5.0, [1.0; 4], 12).len(), 36);
        // Degenerate segment counts are bumped to a triangle
        assert_eq!(circle(Vec2::ZERO, 5.0, [1.0; 4], 1).len(), 9);
    }

    #[test]
    fn test_polygon_rotation() {
        let outline = [Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0), Vec2::new(-10.0, 0.0)];
        let verts = polygon(Vec2::ZERO, &outline, PI / 2.0, [1.0; 4]);
        assert_eq!(verts.len(), 9);
        // (10, 0) rotated a quarter turn lands on (0, 10)
        assert!((verts[1].position[0]).abs() < 1e-4);
        assert!((verts[1].position[1] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_number_segments() {
        // "8" lights all seven segments, "1" lights two
        assert_eq!(number(8, Vec2::ZERO, 20.0, [1.0; 4]).len(), 7 * 6);
        assert_eq!(number(1, Vec2::ZERO, 20.0, [1.0; 4]).len(), 2 * 6);
        assert_eq!(number(18, Vec2::ZERO, 20.0, [1.0; 4]).len(), 9 * 6);
    }

    #[test]
    fn test_number_is_centered() {
        let verts = number(42, Vec2::new(100.0, 50.0), 20.0, [1.0; 4]);
        let min_x = verts.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        let max_x = verts.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!(((min_x + max_x) / 2.0 - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_trail_needs_two_points() {
        let point = TrailPoint {
            pos: Vec2::ZERO,
            width: 10.0,
            alpha: 1.0,
        };
        assert!(engine_trail(&[point], [1.0; 4]).is_empty());
        let next = TrailPoint {
            pos: Vec2::new(0.0, 2.0),
            ..point
        };
        assert_eq!(engine_trail(&[point, next], [1.0; 4]).len(), 6);
    }
}
