//! Arrowheads expressed through the drawing-context contract.

use crate::{draw::DrawContext, geometry::Point};

/// Length of the arrowhead along the incoming direction
const ARROW_LENGTH: f64 = 8.0;
/// Half the width of the arrowhead base
const ARROW_HALF_WIDTH: f64 = 5.0;

/// Draws a filled triangular arrowhead whose tip sits at `tip`.
///
/// `angle` is the direction of travel of the line arriving at the tip, so
/// the triangle's base lies behind the tip along that direction.
pub fn draw_arrow<C: DrawContext + ?Sized>(ctx: &mut C, tip: Point, angle: f64) {
    let (dy, dx) = angle.sin_cos();
    let back = Point::new(tip.x() - ARROW_LENGTH * dx, tip.y() - ARROW_LENGTH * dy);

    ctx.begin_path();
    ctx.move_to(tip);
    ctx.line_to(Point::new(
        back.x() + ARROW_HALF_WIDTH * dy,
        back.y() - ARROW_HALF_WIDTH * dx,
    ));
    ctx.line_to(Point::new(
        back.x() - ARROW_HALF_WIDTH * dy,
        back.y() + ARROW_HALF_WIDTH * dx,
    ));
    ctx.fill();
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::draw::{DrawOp, Recorder};

    #[test]
    fn test_arrow_points_along_positive_x() {
        let mut recorder = Recorder::new();
        draw_arrow(&mut recorder, Point::new(100.0, 50.0), 0.0);

        let ops = recorder.ops();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0], DrawOp::BeginPath);
        assert_eq!(ops[1], DrawOp::MoveTo(Point::new(100.0, 50.0)));
        let DrawOp::LineTo(left) = ops[2] else {
            panic!("expected line_to, got {:?}", ops[2]);
        };
        let DrawOp::LineTo(right) = ops[3] else {
            panic!("expected line_to, got {:?}", ops[3]);
        };
        assert_approx_eq!(f64, left.x(), 92.0);
        assert_approx_eq!(f64, left.y(), 45.0);
        assert_approx_eq!(f64, right.x(), 92.0);
        assert_approx_eq!(f64, right.y(), 55.0);
        assert_eq!(ops[4], DrawOp::Fill);
    }
}
