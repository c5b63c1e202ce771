use crate::{
    project::{Point, PointRef, GRAB_THRESHOLD},
    simplify::{optimize_points, OPTIMIZE_TOLERANCE},
    sketchpad::Sketchpad,
};

/// What the pointer is doing between press and release. Dragging and
/// drawing exclude each other; the choice is made on press.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    Idle,
    Drawing(Vec<Point>),
    Dragging {
        point: PointRef,
        last_x: f64,
        last_y: f64,
    },
}

impl Sketchpad {
    /// Grabs the control point under the pointer, or starts a new stroke.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.gesture = match self.project.find_nearest_point(x, y, GRAB_THRESHOLD) {
            Some(point) => {
                log::debug!("dragging {:?}", point);
                Gesture::Dragging {
                    point,
                    last_x: x,
                    last_y: y,
                }
            }
            None => Gesture::Drawing(vec![Point::new(x, y)]),
        };

        true
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::Drawing(points) => {
                points.push(Point::new(x, y));
                true
            }
            Gesture::Dragging {
                point,
                last_x,
                last_y,
            } => {
                let (dx, dy) = (x - *last_x, y - *last_y);
                *last_x = x;
                *last_y = y;

                let point = *point;

                if let Err(err) = self.project.move_point(point, dx, dy, self.canvas) {
                    log::warn!("dropping drag: {}", err);
                    self.gesture = Gesture::Idle;
                }

                true
            }
        }
    }

    /// Ends the gesture. A stroke with at least two points is cleaned up
    /// and stored on the current track.
    pub fn pointer_up(&mut self) -> bool {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => false,
            Gesture::Dragging { .. } => true,
            Gesture::Drawing(points) => {
                if points.len() > 1 {
                    let points = optimize_points(&points, OPTIMIZE_TOLERANCE);

                    let track = self.current_track;

                    match self.project.append_curve(track, points, self.curve_instrument) {
                        Ok(index) => log::debug!("stored curve {} on track {}", index, track),
                        Err(err) => log::warn!("dropping stroke: {}", err),
                    }
                }

                true
            }
        }
    }
}
