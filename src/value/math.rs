//! `glam` conversions: vectors map to [`Value::Vector`], `Mat4` to a
//! column-major 4x4 [`Value::Matrix`].

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::{FromValue, Value, ValueKind};

macro_rules! impl_glam_vector {
    ($ty:ty, $n:literal) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Vector(v.to_array().iter().map(|c| f64::from(*c)).collect())
            }
        }

        impl FromValue for $ty {
            const KIND: ValueKind = ValueKind::Vector;

            fn from_value(value: Value) -> Option<Self> {
                let Value::Vector(components) = value else {
                    return None;
                };
                if components.len() != $n {
                    return None;
                }
                let mut out = [0.0f32; $n];
                for (slot, c) in out.iter_mut().zip(components) {
                    *slot = c as f32;
                }
                Some(<$ty>::from_array(out))
            }
        }
    };
}

impl_glam_vector!(Vec2, 2);
impl_glam_vector!(Vec3, 3);
impl_glam_vector!(Vec4, 4);

impl From<Mat4> for Value {
    fn from(m: Mat4) -> Self {
        Value::Matrix(
            m.to_cols_array_2d()
                .iter()
                .map(|col| col.iter().map(|c| f64::from(*c)).collect())
                .collect(),
        )
    }
}

impl FromValue for Mat4 {
    const KIND: ValueKind = ValueKind::Matrix;

    fn from_value(value: Value) -> Option<Self> {
        let Value::Matrix(cols) = value else {
            return None;
        };
        if cols.len() != 4 || cols.iter().any(|col| col.len() != 4) {
            return None;
        }
        let mut out = [[0.0f32; 4]; 4];
        for (dst, src) in out.iter_mut().zip(&cols) {
            for (slot, c) in dst.iter_mut().zip(src) {
                *slot = *c as f32;
            }
        }
        Some(Mat4::from_cols_array_2d(&out))
    }
}
