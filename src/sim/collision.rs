//! Narrow-phase overlap tests
//!
//! Exact predicates for circle vs circle and oriented box vs circle. All
//! distance comparisons are done on squared values, so no square root is
//! taken. Box vs box is never reported as overlapping.

use super::fixed::Fixed;
use super::vector::FixedVec3;
use super::volume::{Shape, Volume};
use crate::error::ArithmeticError;

/// `|a - b| <= reach`, compared squared.
///
/// A separation too large to square cannot be within any representable
/// reach, so it counts as a miss.
fn within(a: FixedVec3, b: FixedVec3, reach: Fixed) -> bool {
    let Ok(distance_sq) = a.checked_sub(b).and_then(FixedVec3::checked_length_squared) else {
        return false;
    };
    match reach.checked_mul(reach) {
        Ok(reach_sq) => distance_sq <= reach_sq,
        // reach beyond sqrt(MAX) covers every representable distance
        Err(_) => true,
    }
}

/// Check if two circles overlap (touching counts)
pub fn circle_vs_circle(a: FixedVec3, a_radius: Fixed, b: FixedVec3, b_radius: Fixed) -> bool {
    within(a, b, a_radius + b_radius)
}

/// Closest point of an oriented rectangle to `point`.
///
/// The point is rotated into the box frame by `-angle` about the box centre,
/// clamped to the half extents and rotated back.
pub fn closest_point_on_box(
    center: FixedVec3,
    half_width: Fixed,
    half_height: Fixed,
    angle: Fixed,
    point: FixedVec3,
) -> Result<FixedVec3, ArithmeticError> {
    let local = point.checked_sub(center)?.rotate(-angle);
    let clamped = FixedVec3::xy(
        local.x.clamp(-half_width, half_width),
        local.y.clamp(-half_height, half_height),
    );
    center.checked_add(clamped.rotate(angle))
}

/// Check if an oriented box overlaps a circle
pub fn box_vs_circle(
    center: FixedVec3,
    half_width: Fixed,
    half_height: Fixed,
    angle: Fixed,
    circle: FixedVec3,
    radius: Fixed,
) -> bool {
    // An offset too large to represent is far outside any box
    let Ok(closest) = closest_point_on_box(center, half_width, half_height, angle, circle) else {
        return false;
    };
    within(closest, circle, radius)
}

/// Overlap test between two volumes. Symmetric: `overlaps(a, b) ==
/// overlaps(b, a)`.
pub fn overlaps(a: &Volume, b: &Volume) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_vs_circle(a.position, ra, b.position, rb)
        }
        (Shape::OrientedBox { .. }, Shape::Circle { .. }) => oriented_box_vs_circle(a, b),
        (Shape::Circle { .. }, Shape::OrientedBox { .. }) => oriented_box_vs_circle(b, a),
        (Shape::OrientedBox { .. }, Shape::OrientedBox { .. }) => false,
    }
}

fn oriented_box_vs_circle(boxed: &Volume, circle: &Volume) -> bool {
    match (boxed.shape, circle.shape) {
        (
            Shape::OrientedBox {
                half_width,
                half_height,
                angle,
            },
            Shape::Circle { radius },
        ) => box_vs_circle(
            boxed.position,
            half_width,
            half_height,
            angle,
            circle.position,
            radius,
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::volume::{Layer, LayerMask};
    use proptest::prelude::*;

    fn fx(s: &str) -> Fixed {
        s.parse().unwrap()
    }

    fn circle(x: &str, y: &str, r: &str) -> Volume {
        Volume::circle(
            fx(r),
            FixedVec3::xy(fx(x), fx(y)),
            Layer::new(0).unwrap(),
            LayerMask::ALL,
        )
    }

    fn rect(x: &str, y: &str, hw: &str, hh: &str, angle: Fixed) -> Volume {
        Volume::oriented_box(
            fx(hw),
            fx(hh),
            angle,
            FixedVec3::xy(fx(x), fx(y)),
            Layer::new(2).unwrap(),
            LayerMask::ALL,
        )
    }

    #[test]
    fn test_circle_overlap_scenario() {
        let a = circle("0", "0", "1");
        assert!(overlaps(&a, &circle("1.5", "0", "1")));
        assert!(!overlaps(&a, &circle("3", "0", "1")));
    }

    #[test]
    fn test_circle_touching_counts() {
        let a = circle("0", "0", "1");
        assert!(overlaps(&a, &circle("2", "0", "1")));
        assert!(!overlaps(&a, &circle("2.000001", "0", "1")));
    }

    #[test]
    fn test_squared_form_not_raw_distance() {
        // Distance 3 vs reach 2: raw distance 3 <= reach^2 4 would wrongly hit
        assert!(!overlaps(&circle("0", "0", "1"), &circle("3", "0", "1")));
    }

    #[test]
    fn test_far_apart_does_not_overflow() {
        let a = Volume::circle(
            Fixed::ONE,
            FixedVec3::xy(Fixed::MIN, Fixed::ZERO),
            Layer::new(0).unwrap(),
            LayerMask::ALL,
        );
        let b = circle("0", "0", "1");
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn test_box_axis_aligned() {
        let b = rect("0", "0", "2", "0.5", Fixed::ZERO);
        assert!(overlaps(&b, &circle("1.5", "0", "0.75")));
        assert!(overlaps(&b, &circle("2.5", "0", "0.75")));
        assert!(!overlaps(&b, &circle("0", "1.5", "0.75")));
        // Corner region
        assert!(!overlaps(&b, &circle("2.6", "1.1", "0.75")));
    }

    #[test]
    fn test_box_uses_its_angle() {
        let upright = rect("0", "0", "2", "0.5", Fixed::FRAC_PI_2);
        assert!(overlaps(&upright, &circle("0", "1.5", "0.75")));
        assert!(!overlaps(&upright, &circle("1.5", "0", "0.75")));
    }

    #[test]
    fn test_box_circle_order_is_normalized() {
        let b = rect("1", "1", "1", "0.25", Fixed::from_ratio(1, 3));
        let c = circle("1.8", "1.5", "0.4");
        assert_eq!(overlaps(&b, &c), overlaps(&c, &b));
    }

    #[test]
    fn test_circle_centre_inside_box() {
        let b = rect("5", "5", "1", "1", Fixed::from_ratio(2, 3));
        assert!(overlaps(&b, &circle("5.2", "4.9", "0.01")));
    }

    #[test]
    fn test_box_vs_box_never_overlaps() {
        let a = rect("0", "0", "1", "1", Fixed::ZERO);
        assert!(!overlaps(&a, &a.clone()));
    }

    #[test]
    fn test_closest_point() {
        let p = closest_point_on_box(
            FixedVec3::ZERO,
            Fixed::from_int(2),
            Fixed::ONE,
            Fixed::ZERO,
            FixedVec3::from_ints(5, 5),
        );
        assert_eq!(p, Ok(FixedVec3::from_ints(2, 1)));
    }

    #[test]
    fn test_far_circle_misses_box() {
        let far = FixedVec3::xy(Fixed::MIN, Fixed::ZERO);
        let center = FixedVec3::xy(Fixed::MAX, Fixed::ZERO);
        assert_eq!(
            closest_point_on_box(center, Fixed::ONE, Fixed::ONE, Fixed::ZERO, far),
            Err(ArithmeticError::Overflow)
        );
        assert!(!box_vs_circle(center, Fixed::ONE, Fixed::ONE, Fixed::ZERO, far, Fixed::ONE));
    }

    proptest! {
        #[test]
        fn prop_circle_symmetry(
            ax in -1000i64..1000, ay in -1000i64..1000, ar in 1i64..500,
            bx in -1000i64..1000, by in -1000i64..1000, br in 1i64..500,
        ) {
            let scale = |v: i64| Fixed::from_raw(v << 24);
            let a = FixedVec3::xy(scale(ax), scale(ay));
            let b = FixedVec3::xy(scale(bx), scale(by));
            prop_assert_eq!(
                circle_vs_circle(a, scale(ar), b, scale(br)),
                circle_vs_circle(b, scale(br), a, scale(ar))
            );
        }

        #[test]
        fn prop_volume_symmetry(
            cx in -500i64..500, cy in -500i64..500, r in 1i64..200,
            angle in 0i64..(26986075409i64 >> 16),
        ) {
            let scale = |v: i64| Fixed::from_raw(v << 24);
            let boxed = Volume::oriented_box(
                scale(120), scale(40), Fixed::from_raw(angle << 16),
                FixedVec3::ZERO, Layer::new(2).unwrap(), LayerMask::ALL,
            );
            let c = Volume::circle(
                scale(r), FixedVec3::xy(scale(cx), scale(cy)),
                Layer::new(0).unwrap(), LayerMask::ALL,
            );
            prop_assert_eq!(overlaps(&boxed, &c), overlaps(&c, &boxed));
        }
    }
}
