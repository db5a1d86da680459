use nalgebra::Point3;

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

/// Angle A-B-C at vertex B, in degrees.
pub fn angle_degrees(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let denom = ba.norm() * bc.norm();
    if denom == 0.0 {
        return f64::NAN;
    }
    let cos = (ba.dot(&bc) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Torsion angle A-B-C-D in degrees, signed by the right-hand rule around
/// the B-C axis.
pub fn torsion_degrees(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    let ab = b - a;
    let bc = c - b;
    let cd = d - c;

    let n1 = ab.cross(&bc);
    let n2 = bc.cross(&cd);
    let denom = n1.norm() * n2.norm();
    if denom == 0.0 {
        return f64::NAN;
    }
    let cos = (n1.dot(&n2) / denom).clamp(-1.0, 1.0);
    let angle = cos.acos().to_degrees();
    if n1.cross(&n2).dot(&bc) < 0.0 { -angle } else { angle }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_of_a_345_triangle() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 0.0);
        assert!((distance(&a, &b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn right_angle_measures_ninety_degrees() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        assert!((angle_degrees(&a, &b, &c) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_points_measure_straight_angle() {
        let a = Point3::new(-1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        assert!((angle_degrees(&a, &b, &c) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_angle_is_nan() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(angle_degrees(&p, &p, &p).is_nan());
    }

    #[test]
    fn torsion_of_a_staggered_quad() {
        // Perpendicular planes around the B-C axis.
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let d = Point3::new(0.0, 1.0, 1.0);
        let t = torsion_degrees(&a, &b, &c, &d);
        assert!((t.abs() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn torsion_of_a_planar_cis_quad_is_zero() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let d = Point3::new(1.0, 1.0, 0.0);
        assert!(torsion_degrees(&a, &b, &c, &d).abs() < 1e-9);
    }
}
