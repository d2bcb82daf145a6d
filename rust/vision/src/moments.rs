// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial moments of closed boundary polygons
//!
//! Moments are integrated over the polygon interior with Green's theorem,
//! so they only depend on the boundary vertices:
//!
//! ```text
//! a_i = x_i * y_{i+1} - x_{i+1} * y_i
//! m00 = 1/2 * sum(a_i)
//! m10 = 1/6 * sum((x_i + x_{i+1}) * a_i)
//! m01 = 1/6 * sum((y_i + y_{i+1}) * a_i)
//! ```
//!
//! The sign of the sums depends on the winding direction. Results are
//! normalized so that `m00 >= 0` whichever way the boundary was traced.

use crate::types::Point2D;
use serde::{Deserialize, Serialize};

/// Zeroth and first order raw moments
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    pub fn new(m00: f64, m10: f64, m01: f64) -> Self {
        Self { m00, m10, m01 }
    }

    /// Moments of the polygon enclosed by `points` (implicitly closed)
    pub fn from_polygon(points: &[Point2D]) -> Self {
        let n = points.len();
        if n < 3 {
            return Self::default();
        }

        let mut a00 = 0.0;
        let mut a10 = 0.0;
        let mut a01 = 0.0;
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            a00 += cross;
            a10 += (p.x + q.x) * cross;
            a01 += (p.y + q.y) * cross;
        }

        let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }

    /// Centroid `(m10 / m00, m01 / m00)`, or `None` for a zero-area polygon
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}
