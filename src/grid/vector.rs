//! # 向量工具
//!
//! 网格几何用到的三维向量辅助函数。
//!
//! ## 依赖关系
//! - 被 `grid/mod.rs` 使用
//! - 使用 `nalgebra::Vector3`

use nalgebra::Vector3;

/// 平行判定的相对容差
const PARALLEL_TOLERANCE: f64 = 1e-10;

/// 向量长度
pub fn length(v: &Vector3<f64>) -> f64 {
    v.norm()
}

/// 单位向量；零向量返回 NaN 分量
pub fn norm(v: &Vector3<f64>) -> Vector3<f64> {
    v / v.norm()
}

/// 两向量夹角（弧度）；任一为零向量时为 NaN
pub fn angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return f64::NAN;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// 是否平行（含反平行）
pub fn check_parallel(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    a.cross(b).norm() <= PARALLEL_TOLERANCE * a.norm() * b.norm()
}

/// 三个分量的 "[x y z]" 形式
pub fn format_vector(v: &Vector3<f64>) -> String {
    format!("[{} {} {}]", v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_length() {
        assert_eq!(length(&Vector3::new(0.0, 0.0, 0.0)), 0.0);
        assert_eq!(length(&Vector3::new(1.0, 0.0, 0.0)), 1.0);
        assert!((length(&Vector3::new(1.0, 1.0, 0.0)) - 2f64.sqrt()).abs() < 1e-15);
        assert!((length(&Vector3::new(1.0, 1.0, -1.0)) - 3f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn test_check_parallel() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        assert!(check_parallel(&x, &x));
        assert!(check_parallel(&x, &Vector3::new(-1.0, 0.0, 0.0)));
        assert!(!check_parallel(&x, &Vector3::new(0.0, 1.0, 0.0)));
        assert!(!check_parallel(
            &Vector3::new(1.0, 1.0, 0.0),
            &Vector3::new(-1.0, 1.0, 0.0)
        ));
    }

    #[test]
    fn test_angle() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        assert!((angle(&x, &y) - PI / 2.0).abs() < 1e-15);
        assert_eq!(angle(&y, &y), 0.0);
        assert!(angle(&x, &Vector3::zeros()).is_nan());
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&Vector3::new(2.0, 0.0, 0.0)), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(norm(&Vector3::new(0.1, 0.0, 0.0)), Vector3::new(1.0, 0.0, 0.0));
        let n = norm(&Vector3::new(1.0, 2.0, 3.0));
        assert!((n[0] - 0.26726124).abs() < 1e-8);
        assert!((n[1] - 0.53452248).abs() < 1e-8);
        assert!((n[2] - 0.80178373).abs() < 1e-8);
    }

    #[test]
    fn test_format_vector() {
        assert_eq!(format_vector(&Vector3::new(0.0, -3.0, 2.5)), "[0 -3 2.5]");
    }
}
