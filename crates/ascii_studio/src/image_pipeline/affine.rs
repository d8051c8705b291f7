/// 2D affine transform stored as the 3x2 matrix
///
/// ```text
/// | a c e |
/// | b d f |
/// ```
///
/// mapping `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`. The builder methods
/// post-multiply, so each call transforms points *before* the ones already
/// applied: `identity().translate(..).rotate(..)` rotates first, then translates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Affine { e: tx, f: ty, ..Self::IDENTITY }
    }

    /// Rotation in radians; positive angles turn clockwise in y-down space.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Affine { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Affine { a: sx, d: sy, ..Self::IDENTITY }
    }

    /// `self * other`: `other` is applied to points first.
    pub fn then_apply(self, other: Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translate(self, tx: f64, ty: f64) -> Affine {
        self.then_apply(Affine::translation(tx, ty))
    }

    pub fn rotate(self, radians: f64) -> Affine {
        self.then_apply(Affine::rotation(radians))
    }

    pub fn scale(self, sx: f64, sy: f64) -> Affine {
        self.then_apply(Affine::scaling(sx, sy))
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.e, self.f].iter().all(|v| v.is_finite())
    }

    /// `None` when the transform collapses the plane or holds non-finite values.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.determinant();
        if !self.is_finite() || !det.is_finite() || det == 0.0 {
            return None;
        }

        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        let e = -(a * self.e + c * self.f);
        let f = -(b * self.e + d * self.f);
        let inverse = Affine { a, b, c, d, e, f };
        inverse.is_finite().then_some(inverse)
    }
}
