//! # 散射因子服务
//!
//! 引擎通过 `FormFactorSource` trait 获取各元素的散射因子，
//! 内置实现 `StandardTables` 提供常用元素的数据表。
//!
//! ## 公式
//! - X 射线：f(s) = Σᵢ aᵢ exp(-bᵢ s²) + c，s = sin(θ)/λ = |Q|/4π
//! - 中子：相干散射长度 b_c (fm)，与 |Q| 无关
//! - 磁散射：⟨j0⟩(s) = A exp(-a s²) + B exp(-b s²) + C exp(-c s²) + D
//!
//! ## 数据来源
//! - International Tables for Crystallography, Vol. C, Table 6.1.1.4
//! - NIST Center for Neutron Research, neutron scattering lengths
//! - P. J. Brown, International Tables for Crystallography, Vol. C, 4.4.5
//!
//! ## 依赖关系
//! - 被 `fourier/engine.rs` 调用
//! - 纯静态数据，无外部模块依赖

use crate::error::{DiffuseError, Result};

use ndarray::ArrayD;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::LazyLock;

/// 散射因子服务接口
///
/// 找不到对应元素（或离子）时返回 `DiffuseError::NotFound`。
pub trait FormFactorSource: Sync {
    /// 中子相干散射长度
    fn nuclear_factor(&self, species: &str) -> Result<f64>;

    /// X 射线原子散射因子，`q` 为 |Q| (Å⁻¹)
    fn xray_factor(&self, species: &str, q: &ArrayD<f64>) -> Result<ArrayD<f64>>;

    /// 磁散射因子 ⟨j0⟩，`ion` 为离子价态
    fn magnetic_factor(&self, species: &str, q: &ArrayD<f64>, ion: i32) -> Result<ArrayD<f64>>;
}

/// X 射线散射因子参数
#[derive(Debug, Clone, Copy)]
pub struct XrayParams {
    pub a: [f64; 4],
    pub b: [f64; 4],
    pub c: f64,
}

impl XrayParams {
    /// 计算散射因子 f(s)，其中 s = sin(θ)/λ
    pub fn calculate(&self, s: f64) -> f64 {
        let s2 = s * s;
        let mut f = self.c;
        for i in 0..4 {
            f += self.a[i] * (-self.b[i] * s2).exp();
        }
        f
    }
}

/// 磁散射因子 ⟨j0⟩ 参数
#[derive(Debug, Clone, Copy)]
pub struct MagneticParams {
    pub a: [f64; 3],
    pub b: [f64; 3],
    pub d: f64,
}

impl MagneticParams {
    /// 计算 ⟨j0⟩(s)，其中 s = |Q|/4π
    pub fn calculate(&self, s: f64) -> f64 {
        let s2 = s * s;
        let mut f = self.d;
        for i in 0..3 {
            f += self.a[i] * (-self.b[i] * s2).exp();
        }
        f
    }
}

/// X 射线参数表：(元素, a, b, c)
#[rustfmt::skip]
const XRAY_TABLE: &[(&str, [f64; 4], [f64; 4], f64)] = &[
    ("H", [0.493002, 0.322912, 0.140191, 0.040810], [10.5109, 26.1257, 3.14236, 57.7997], 0.003038),
    ("He", [0.8734, 0.6309, 0.3112, 0.1780], [9.1037, 3.3568, 22.9276, 0.9821], 0.0064),
    ("Li", [1.1282, 0.7508, 0.6175, 0.4653], [3.9546, 1.0524, 85.3905, 168.261], 0.0377),
    ("Be", [1.5919, 1.1278, 0.5391, 0.7029], [43.6427, 1.8623, 103.483, 0.5420], 0.0385),
    ("B", [2.0545, 1.3326, 1.0979, 0.7068], [23.2185, 1.0210, 60.3498, 0.1403], -0.1932),
    ("C", [2.3100, 1.0200, 1.5886, 0.8650], [20.8439, 10.2075, 0.5687, 51.6512], 0.2156),
    ("N", [12.2126, 3.1322, 2.0125, 1.1663], [0.0057, 9.8933, 28.9975, 0.5826], -11.529),
    ("O", [3.0485, 2.2868, 1.5463, 0.8670], [13.2771, 5.7011, 0.3239, 32.9089], 0.2508),
    ("F", [3.5392, 2.6412, 1.5170, 1.0243], [10.2825, 4.2944, 0.2615, 26.1476], 0.2776),
    ("Na", [4.7626, 3.1736, 1.2674, 1.1128], [3.2850, 8.8422, 0.3136, 129.424], 0.6760),
    ("Mg", [5.4204, 2.1735, 1.2269, 2.3073], [2.8275, 79.2611, 0.3808, 7.1937], 0.8584),
    ("Al", [6.4202, 1.9002, 1.5936, 1.9646], [3.0387, 0.7426, 31.5472, 85.0886], 1.1151),
    ("Si", [6.2915, 3.0353, 1.9891, 1.5410], [2.4386, 32.3337, 0.6785, 81.6937], 1.1407),
    ("P", [6.4345, 4.1791, 1.7800, 1.4908], [1.9067, 27.1570, 0.5260, 68.1645], 1.1149),
    ("S", [6.9053, 5.2034, 1.4379, 1.5863], [1.4679, 22.2151, 0.2536, 56.1720], 0.8669),
    ("Cl", [11.4604, 7.1964, 6.2556, 1.6455], [0.0104, 1.1662, 18.5194, 47.7784], -9.5574),
    ("K", [8.2186, 7.4398, 1.0519, 0.8659], [12.7949, 0.7748, 213.187, 41.6841], 1.4228),
    ("Ca", [8.6266, 7.3873, 1.5899, 1.0211], [10.4421, 0.6599, 85.7484, 178.437], 1.3751),
    ("Ti", [9.7595, 7.3558, 1.6991, 1.9021], [7.8508, 0.5000, 35.6338, 116.105], 1.2807),
    ("V", [10.2971, 7.3511, 2.0703, 2.0571], [6.8657, 0.4385, 26.8938, 102.478], 1.2199),
    ("Cr", [10.6406, 7.3537, 3.3240, 1.4922], [6.1038, 0.3920, 20.2626, 98.7399], 1.1832),
    ("Mn", [11.2819, 7.3573, 3.0193, 2.2441], [5.3409, 0.3432, 17.8674, 83.7543], 1.0896),
    ("Fe", [11.7695, 7.3573, 3.5222, 2.3045], [4.7611, 0.3072, 15.3535, 76.8805], 1.0369),
    ("Co", [12.2841, 7.3409, 4.0034, 2.3488], [4.2791, 0.2784, 13.5359, 71.1692], 1.0118),
    ("Ni", [12.8376, 7.2920, 4.4438, 2.3800], [3.8785, 0.2565, 12.1763, 66.3421], 1.0341),
    ("Cu", [13.3380, 7.1676, 5.6158, 1.6735], [3.5828, 0.2470, 11.3966, 64.8126], 1.1910),
    ("Zn", [14.0743, 7.0318, 5.1652, 2.4100], [3.2655, 0.2333, 10.3163, 58.7097], 1.3041),
    ("Ga", [15.2354, 6.7006, 4.3591, 2.9623], [3.0669, 0.2412, 10.7805, 61.4135], 1.7189),
    ("Ge", [16.0816, 6.3747, 3.7068, 3.6830], [2.8509, 0.2516, 11.4468, 54.7625], 2.1313),
    ("As", [16.6723, 6.0701, 3.4313, 4.2779], [2.6345, 0.2647, 12.9479, 47.7972], 2.531),
    ("Se", [17.0006, 5.8196, 3.9731, 4.3543], [2.4098, 0.2726, 15.2372, 43.8163], 2.8409),
    ("Br", [17.1789, 5.2358, 5.6377, 3.9851], [2.1723, 16.5796, 0.2609, 41.4328], 2.9557),
    ("Rb", [17.5816, 7.6598, 5.8981, 2.7817], [1.7139, 14.7957, 0.1603, 31.2087], 2.0782),
    ("Sr", [17.5663, 9.8184, 5.4220, 2.6694], [1.5564, 14.0988, 0.1664, 132.376], 2.5064),
    ("Y", [17.7760, 10.2946, 5.7263, 3.2656], [1.4029, 12.8006, 0.1255, 104.354], 1.9341),
    ("Zr", [17.8765, 10.9480, 5.4173, 3.6577], [1.2761, 11.9160, 0.1176, 87.6627], 2.0690),
    ("Nb", [17.6142, 12.0144, 4.0418, 3.5334], [1.1886, 11.7660, 0.2047, 69.7957], 3.7553),
    ("Mo", [3.7025, 17.2356, 12.8876, 3.7429], [0.2772, 1.0958, 11.0040, 61.6584], 4.3875),
    ("Ag", [19.2808, 16.6885, 4.8045, 1.0463], [0.6446, 7.4726, 24.6605, 99.8156], 5.1790),
    ("Ba", [20.3361, 19.2970, 10.8880, 2.6959], [3.2160, 0.2756, 20.2073, 167.202], 2.7731),
    ("La", [20.5780, 19.5990, 11.3727, 3.2879], [2.9480, 0.2440, 18.7726, 133.124], 2.1461),
    ("Ce", [21.1671, 19.7695, 11.8513, 3.3303], [2.8129, 0.2268, 17.6083, 127.113], 1.8623),
    ("Au", [16.8819, 18.5913, 25.5582, 5.8600], [0.4611, 8.6216, 1.4826, 36.3956], 12.0658),
    ("Pb", [31.0617, 13.0637, 18.4420, 5.9696], [0.6902, 2.3576, 8.6180, 47.2579], 13.4118),
    ("Bi", [33.3689, 12.9510, 16.5877, 6.4692], [0.7040, 2.9238, 8.7937, 48.0093], 13.5782),
];

/// 中子相干散射长度 b_c (fm)
#[rustfmt::skip]
const NEUTRON_TABLE: &[(&str, f64)] = &[
    ("H", -3.739), ("He", 3.26), ("Li", -1.90), ("Be", 7.79), ("B", 5.30),
    ("C", 6.646), ("N", 9.36), ("O", 5.803), ("F", 5.654), ("Na", 3.63),
    ("Mg", 5.375), ("Al", 3.449), ("Si", 4.1491), ("P", 5.13), ("S", 2.847),
    ("Cl", 9.577), ("K", 3.67), ("Ca", 4.70), ("Ti", -3.438), ("V", -0.3824),
    ("Cr", 3.635), ("Mn", -3.73), ("Fe", 9.45), ("Co", 2.49), ("Ni", 10.3),
    ("Cu", 7.718), ("Zn", 5.68), ("Ga", 7.288), ("Ge", 8.185), ("As", 6.58),
    ("Se", 7.970), ("Br", 6.795), ("Rb", 7.09), ("Sr", 7.02), ("Y", 7.75),
    ("Zr", 7.16), ("Nb", 7.054), ("Mo", 6.715), ("Ag", 5.922), ("Ba", 5.07),
    ("La", 8.24), ("Ce", 4.84), ("Gd", 6.5), ("Dy", 16.9), ("Ho", 8.01),
    ("Au", 7.63), ("Pb", 9.405), ("Bi", 8.532),
];

/// ⟨j0⟩ 参数表：(元素, 价态, [A, B, C], [a, b, c], D)
#[rustfmt::skip]
const MAGNETIC_TABLE: &[(&str, i32, [f64; 3], [f64; 3], f64)] = &[
    ("Cr", 3, [-0.3094, 0.3680, 0.6559], [0.0274, 17.0355, 6.5236], 0.2856),
    ("Mn", 2, [0.4220, 0.5948, 0.0043], [17.6840, 6.0050, -0.6090], -0.0219),
    ("Fe", 2, [0.0263, 0.3668, 0.6188], [34.9597, 15.9435, 5.5935], -0.0119),
    ("Fe", 3, [0.3972, 0.6295, -0.0314], [13.2442, 4.9034, 0.3496], 0.0044),
    ("Co", 2, [0.4332, 0.5857, -0.0382], [14.3553, 4.6077, 0.1338], 0.0179),
    ("Ni", 2, [0.0163, 0.3916, 0.6052], [35.8826, 13.2233, 4.3388], -0.0133),
    ("Cu", 2, [0.0232, 0.4023, 0.5882], [34.9686, 11.5640, 3.8428], -0.0137),
    ("Gd", 3, [0.0186, 0.2895, 0.7135], [25.3867, 11.1421, 3.7266], -0.0217),
    ("Dy", 3, [0.1157, 0.3270, 0.5821], [15.0732, 6.7991, 3.0202], -0.0249),
    ("Ho", 3, [0.0566, 0.3365, 0.6317], [18.3176, 7.6880, 2.9427], -0.0248),
];

static XRAY_FACTORS: LazyLock<HashMap<&'static str, XrayParams>> = LazyLock::new(|| {
    XRAY_TABLE
        .iter()
        .map(|&(el, a, b, c)| (el, XrayParams { a, b, c }))
        .collect()
});

static NEUTRON_LENGTHS: LazyLock<HashMap<&'static str, f64>> =
    LazyLock::new(|| NEUTRON_TABLE.iter().copied().collect());

/// 元素 -> (价态 -> 参数)
static MAGNETIC_FACTORS: LazyLock<HashMap<&'static str, HashMap<i32, MagneticParams>>> =
    LazyLock::new(|| {
        let mut table: HashMap<&'static str, HashMap<i32, MagneticParams>> = HashMap::new();
        for &(el, ion, a, b, d) in MAGNETIC_TABLE {
            table.entry(el).or_default().insert(ion, MagneticParams { a, b, d });
        }
        table
    });

/// 元素符号查找：先直接匹配，再取开头的字母部分（处理如 "Fe1"、"Ho3+" 这样的标签）
fn lookup<'a, V>(table: &'a HashMap<&'static str, V>, species: &str) -> Option<&'a V> {
    if let Some(v) = table.get(species) {
        return Some(v);
    }
    table.get(element_symbol(species))
}

/// 标签中开头的字母部分，如 "Fe1" -> "Fe"
pub fn element_symbol(species: &str) -> &str {
    let end = species
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(species.len());
    &species[..end]
}

fn not_found(kind: &str, species: &str) -> DiffuseError {
    DiffuseError::NotFound {
        kind: kind.to_string(),
        species: species.to_string(),
    }
}

/// |Q| 转换为 s = |Q|/4π
fn q_to_s(q: f64) -> f64 {
    q / (4.0 * PI)
}

/// 内置散射因子数据表
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTables;

impl FormFactorSource for StandardTables {
    fn nuclear_factor(&self, species: &str) -> Result<f64> {
        lookup(&*NEUTRON_LENGTHS, species)
            .copied()
            .ok_or_else(|| not_found("neutron", species))
    }

    fn xray_factor(&self, species: &str, q: &ArrayD<f64>) -> Result<ArrayD<f64>> {
        let params = lookup(&*XRAY_FACTORS, species).ok_or_else(|| not_found("x-ray", species))?;
        Ok(q.mapv(|q| params.calculate(q_to_s(q))))
    }

    fn magnetic_factor(&self, species: &str, q: &ArrayD<f64>, ion: i32) -> Result<ArrayD<f64>> {
        let symbol = element_symbol(species);
        let params = MAGNETIC_FACTORS
            .get(symbol)
            .and_then(|ions| ions.get(&ion))
            .ok_or_else(|| not_found("magnetic", &format!("{}{}+", symbol, ion)))?;
        Ok(q.mapv(|q| params.calculate(q_to_s(q))))
    }
}
