//! Small fixed-size vector helpers on `[f64; 3]`.

/// A position or direction in 3D space.
pub type Vector = [f64; 3];

/// Zero vector.
pub const ZERO: Vector = [0.0; 3];

#[inline]
pub fn add(a: Vector, b: Vector) -> Vector {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vector, b: Vector) -> Vector {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vector, s: f64) -> Vector {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vector, b: Vector) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vector, b: Vector) -> Vector {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length.
#[inline]
pub fn mag(a: Vector) -> f64 {
    dot(a, a).sqrt()
}

/// Arithmetic mean of a non-empty set of points; `ZERO` when empty.
pub fn average<I>(points: I) -> Vector
where
    I: IntoIterator<Item = Vector>,
{
    let mut sum = ZERO;
    let mut n = 0usize;
    for p in points {
        sum = add(sum, p);
        n += 1;
    }
    if n == 0 { ZERO } else { scale(sum, 1.0 / n as f64) }
}
