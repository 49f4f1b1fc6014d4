use cgmath::InnerSpace;

pub type Vector3 = cgmath::Vector3<f32>;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Triangle {
    pub p0: Vector3,
    pub p1: Vector3,
    pub p2: Vector3,
}

impl Triangle {
    /// Unit normal following the right-hand rule over `p0 -> p1 -> p2`.
    ///
    /// Degenerate triangles (zero area) have no defined normal and yield the zero vector,
    /// which is also what most STL consumers expect for such facets.
    pub fn normal(&self) -> Vector3 {
        let n = (self.p1 - self.p0).cross(self.p2 - self.p0);
        let len = n.magnitude();
        if len <= f32::EPSILON {
            Vector3::new(0.0, 0.0, 0.0)
        } else {
            n / len
        }
    }
}

impl std::default::Default for Triangle {
    fn default() -> Self {
        let origin = Vector3::new(0.0, 0.0, 0.0);
        Self {
            p0: origin,
            p1: origin,
            p2: origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_of_ccw_triangle_points_up() {
        let t = Triangle {
            p0: Vector3::new(0.0, 0.0, 0.0),
            p1: Vector3::new(1.0, 0.0, 0.0),
            p2: Vector3::new(0.0, 1.0, 0.0),
        };
        assert_eq!(Vector3::new(0.0, 0.0, 1.0), t.normal());
    }

    #[test]
    fn normal_of_degenerate_triangle_is_zero() {
        assert_eq!(Vector3::new(0.0, 0.0, 0.0), Triangle::default().normal());
    }
}
