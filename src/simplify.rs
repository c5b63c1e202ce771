//! Point reduction and smoothing for freehand strokes.
//!
//! The three operations are not interchangeable: [`optimize_points`] is the
//! general cleanup applied to committed strokes, [`smooth_points`] backs the
//! explicit smoothing command and [`reduce_points`] bounds the point count
//! while keeping sharp turns.

use crate::{mapping::CanvasSize, project::Point};

pub const OPTIMIZE_TOLERANCE: f64 = 5.0;
pub const REDUCE_TOLERANCE: f64 = 2.0;

const TENSION: f64 = 0.3;
const WINDOW_SIZE: usize = 5;
const KEEP_EVERY: usize = 10;

fn smooth_point(prev: &Point, curr: &Point, next: &Point) -> Point {
    Point {
        x: curr.x + (next.x - prev.x) * TENSION * 0.5,
        y: curr.y + (next.y - prev.y) * TENSION * 0.5,
        width: curr.width,
    }
}

/// Drops every point within `tolerance` of the last kept one and nudges the
/// kept ones along the local tangent. First and last points are kept as is.
pub fn optimize_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut result = vec![points[0]];
    let mut last = points[0];

    for i in 1..points.len() - 1 {
        let point = &points[i];

        if point.distance(&last) > tolerance {
            let smoothed = smooth_point(&last, point, &points[i + 1]);
            result.push(smoothed);
            last = smoothed;
        }
    }

    result.push(points[points.len() - 1]);
    result
}

/// Triangular-weighted moving average over a window of five points.
/// Endpoints are untouched, everything else is kept on the canvas.
pub fn smooth_points(points: &[Point], canvas: CanvasSize) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let half = WINDOW_SIZE / 2;
    let last = points.len() - 1;

    let mut result = Vec::with_capacity(points.len());
    result.push(points[0]);

    for i in 1..last {
        let start = i.saturating_sub(half);
        let end = (i + half).min(last);

        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut total = 0.0;

        for (j, point) in points.iter().enumerate().take(end + 1).skip(start) {
            let weight = 1.0 - i.abs_diff(j) as f64 / WINDOW_SIZE as f64;
            sum_x += point.x * weight;
            sum_y += point.y * weight;
            total += weight;
        }

        let (x, y) = canvas.clamp(sum_x / total, sum_y / total);

        result.push(Point {
            x,
            y,
            width: points[i].width,
        });
    }

    result.push(points[last]);
    result
}

/// Distance from `point` to the segment `start..end`.
fn segment_distance(point: &Point, start: &Point, end: &Point) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_squared = dx * dx + dy * dy;

    let t = if length_squared == 0.0 {
        0.0
    } else {
        (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_squared).clamp(0.0, 1.0)
    };

    let closest = Point::new(start.x + t * dx, start.y + t * dy);
    point.distance(&closest)
}

/// Keeps points that stray more than `tolerance` from the chord between the
/// last kept point and the next raw one, plus every tenth point and the
/// neighbours of both endpoints.
pub fn reduce_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let last_index = points.len() - 1;
    let mut result = vec![points[0]];
    let mut last = points[0];

    for i in 1..last_index {
        let point = points[i];
        let distance = segment_distance(&point, &last, &points[i + 1]);

        if distance > tolerance || i % KEEP_EVERY == 0 || i == 1 || i == last_index - 1 {
            result.push(point);
            last = point;
        }
    }

    result.push(points[last_index]);
    result
}
