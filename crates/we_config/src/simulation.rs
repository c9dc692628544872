// crates/we_config/src/simulation.rs

//! 区域海浪模拟配置
//!
//! JSON 字段名沿用外部接口约定（`Hs`、`Tp`、`T_total` 等），
//! 所有数值在进入引擎之前通过 [`SimulationRequest::validate`] 校验。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{check_closed, check_positive, ConfigError};

// ============================================================
// 区域
// ============================================================

/// 矩形区域（经纬度 + 水深）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// 最小经度 [度]
    pub lon_min: f64,
    /// 最小纬度 [度]
    pub lat_min: f64,
    /// 对应点水深 [m]
    pub depth_min: f64,
    /// 最大经度 [度]
    pub lon_max: f64,
    /// 最大纬度 [度]
    pub lat_max: f64,
    /// 对应点水深 [m]
    pub depth_max: f64,
}

impl Region {
    /// 创建区域
    pub fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lat_min,
            depth_min: 10.0,
            lon_max,
            lat_max,
            depth_max: 20.0,
        }
    }

    /// 设置水深范围
    pub fn with_depth(mut self, depth_min: f64, depth_max: f64) -> Self {
        self.depth_min = depth_min;
        self.depth_max = depth_max;
        self
    }

    /// 经度跨度 [度]
    #[inline]
    pub fn lon_range(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// 纬度跨度 [度]
    #[inline]
    pub fn lat_range(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// 区域中心 (lon, lat)
    #[inline]
    pub fn centroid(&self) -> (f64, f64) {
        (
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }

    /// 中间水深 [m]
    #[inline]
    pub fn mid_depth(&self) -> f64 {
        (self.depth_min + self.depth_max) / 2.0
    }

    /// 验证区域
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("region.lon_min", self.lon_min),
            ("region.lat_min", self.lat_min),
            ("region.lon_max", self.lon_max),
            ("region.lat_max", self.lat_max),
            ("region.depth_min", self.depth_min),
            ("region.depth_max", self.depth_max),
        ];
        for (key, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::invalid(key, value, "必须为有限数"));
            }
        }
        if self.lon_max <= self.lon_min {
            return Err(ConfigError::invalid(
                "region.lon_max",
                self.lon_max,
                "lon_max must be greater than lon_min",
            ));
        }
        if self.lat_max <= self.lat_min {
            return Err(ConfigError::invalid(
                "region.lat_max",
                self.lat_max,
                "lat_max must be greater than lat_min",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 风场
// ============================================================

/// 风场参数（单次模拟内恒定）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindConfig {
    /// 风速 [m/s]
    #[serde(default = "default_wind_speed")]
    pub wind_speed: f64,
    /// 风向 [度]，0 表示正北，顺时针增加
    #[serde(default = "default_wind_direction")]
    pub wind_direction_deg: f64,
    /// 风速参考高度 [m]
    #[serde(default = "default_reference_height")]
    pub reference_height_m: f64,
}

fn default_wind_speed() -> f64 { 10.0 }
fn default_wind_direction() -> f64 { 270.0 }
fn default_reference_height() -> f64 { 10.0 }

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            wind_speed: default_wind_speed(),
            wind_direction_deg: default_wind_direction(),
            reference_height_m: default_reference_height(),
        }
    }
}

impl WindConfig {
    /// 验证风场参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_closed("wind.wind_speed", self.wind_speed, 0.0, 40.0)?;
        check_closed("wind.wind_direction_deg", self.wind_direction_deg, 0.0, 360.0)?;
        if !self.reference_height_m.is_finite() {
            return Err(ConfigError::invalid(
                "wind.reference_height_m",
                self.reference_height_m,
                "必须为有限数",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 波浪谱
// ============================================================

/// 波浪谱模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpectrumModel {
    /// Pierson-Moskowitz 充分发展海况谱
    #[default]
    #[serde(rename = "PM")]
    PiersonMoskowitz,
    /// JONSWAP 谱（配置可解析，生成器尚未实现）
    #[serde(rename = "JONSWAP")]
    Jonswap,
}

impl SpectrumModel {
    /// 接口标识
    pub fn id(&self) -> &'static str {
        match self {
            Self::PiersonMoskowitz => "PM",
            Self::Jonswap => "JONSWAP",
        }
    }
}

impl std::fmt::Display for SpectrumModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// 波浪谱参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// 谱模型类型
    #[serde(default)]
    pub spectrum_model_type: SpectrumModel,
    /// 有效波高 [m]
    #[serde(rename = "Hs", default = "default_hs")]
    pub hs: f64,
    /// 峰值周期 [s]
    #[serde(rename = "Tp", default = "default_tp")]
    pub tp: f64,
    /// 主浪向 [度]，缺省时取风向
    #[serde(default)]
    pub main_wave_direction_deg: Option<f64>,
    /// 波向扩散宽度 [度]
    #[serde(default = "default_spread")]
    pub directional_spread_deg: f64,
    /// JONSWAP 峰锐系数
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// 随机相位种子，缺省时使用线程随机源
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_hs() -> f64 { 2.0 }
fn default_tp() -> f64 { 8.0 }
fn default_spread() -> f64 { 30.0 }
fn default_gamma() -> f64 { 3.3 }

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            spectrum_model_type: SpectrumModel::default(),
            hs: default_hs(),
            tp: default_tp(),
            main_wave_direction_deg: None,
            directional_spread_deg: default_spread(),
            gamma: default_gamma(),
            seed: None,
        }
    }
}

impl SpectrumConfig {
    /// 设置随机种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 验证波浪谱参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_closed("spectrum.Hs", self.hs, 0.0, 15.0)?;
        check_closed("spectrum.Tp", self.tp, 2.0, 20.0)?;
        if let Some(dir) = self.main_wave_direction_deg {
            check_closed("spectrum.main_wave_direction_deg", dir, 0.0, 360.0)?;
        }
        check_closed(
            "spectrum.directional_spread_deg",
            self.directional_spread_deg,
            5.0,
            90.0,
        )?;
        check_closed("spectrum.gamma", self.gamma, 1.0, 7.0)?;
        Ok(())
    }
}

// ============================================================
// 离散化
// ============================================================

/// 空间离散化参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscretizationConfig {
    /// 经度方向间隔 [度]
    #[serde(default = "default_spacing")]
    pub dx: f64,
    /// 纬度方向间隔 [度]
    #[serde(default = "default_spacing")]
    pub dy: f64,
    /// 网格点数上限
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_spacing() -> f64 { 0.05 }
fn default_max_points() -> usize { 5000 }

impl Default for DiscretizationConfig {
    fn default() -> Self {
        Self {
            dx: default_spacing(),
            dy: default_spacing(),
            max_points: default_max_points(),
        }
    }
}

impl DiscretizationConfig {
    /// 验证离散化参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("discretization.dx", self.dx)?;
        check_positive("discretization.dy", self.dy)?;
        if self.max_points == 0 {
            return Err(ConfigError::invalid(
                "discretization.max_points",
                self.max_points,
                "至少为 1",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 时间
// ============================================================

/// 时间离散参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// 后端仿真时间步长 [s]，同时也是实时节拍
    #[serde(default = "default_dt_backend")]
    pub dt_backend: f64,
    /// 总仿真时长 [s]，`None` 或 `-1` 表示持续运行
    #[serde(rename = "T_total", default)]
    pub t_total: Option<f64>,
    /// 帧缓存保留时间 [s]，`None` 表示不淘汰
    #[serde(default)]
    pub cache_retention_time: Option<f64>,
}

fn default_dt_backend() -> f64 { 0.2 }

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            dt_backend: default_dt_backend(),
            t_total: None,
            cache_retention_time: None,
        }
    }
}

impl TimeConfig {
    /// 设置总时长
    pub fn with_total(mut self, t_total: f64) -> Self {
        self.t_total = Some(t_total);
        self
    }

    /// 设置缓存保留时间
    pub fn with_retention(mut self, retention: f64) -> Self {
        self.cache_retention_time = Some(retention);
        self
    }

    /// 归一化后的时间上限，`-1` 视为无限制
    pub fn time_limit(&self) -> Option<f64> {
        self.t_total.filter(|&t| t != -1.0)
    }

    /// 验证时间参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("time.dt_backend", self.dt_backend)?;
        if let Some(t) = self.time_limit() {
            if !t.is_finite() || t <= 0.0 {
                return Err(ConfigError::invalid(
                    "time.T_total",
                    t,
                    "T_total must be greater than 0, or use -1/None for unlimited",
                ));
            }
        }
        if let Some(r) = self.cache_retention_time {
            check_positive("time.cache_retention_time", r)?;
        }
        Ok(())
    }
}

// ============================================================
// 完整请求
// ============================================================

/// 一次区域模拟的完整输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// 模拟区域
    pub region: Region,
    /// 风场
    #[serde(default)]
    pub wind: WindConfig,
    /// 波浪谱
    #[serde(default)]
    pub spectrum: SpectrumConfig,
    /// 空间离散化
    #[serde(default)]
    pub discretization: DiscretizationConfig,
    /// 时间离散化
    #[serde(default)]
    pub time: TimeConfig,
}

impl SimulationRequest {
    /// 以默认参数创建区域请求
    pub fn new(region: Region) -> Self {
        Self {
            region,
            wind: WindConfig::default(),
            spectrum: SpectrumConfig::default(),
            discretization: DiscretizationConfig::default(),
            time: TimeConfig::default(),
        }
    }

    /// 设置风场
    pub fn with_wind(mut self, wind: WindConfig) -> Self {
        self.wind = wind;
        self
    }

    /// 设置波浪谱
    pub fn with_spectrum(mut self, spectrum: SpectrumConfig) -> Self {
        self.spectrum = spectrum;
        self
    }

    /// 设置离散化
    pub fn with_discretization(mut self, discretization: DiscretizationConfig) -> Self {
        self.discretization = discretization;
        self
    }

    /// 设置时间配置
    pub fn with_time(mut self, time: TimeConfig) -> Self {
        self.time = time;
        self
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let request: SimulationRequest =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证全部参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.region.validate()?;
        self.wind.validate()?;
        self.spectrum.validate()?;
        self.discretization.validate()?;
        self.time.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Region {
        Region::new(120.0, 30.0, 120.5, 30.5)
    }

    #[test]
    fn test_default_request_is_valid() {
        let request = SimulationRequest::new(region());
        assert!(request.validate().is_ok());
        assert_eq!(request.spectrum.spectrum_model_type, SpectrumModel::PiersonMoskowitz);
        assert_eq!(request.discretization.max_points, 5000);
    }

    #[test]
    fn test_inverted_region_rejected() {
        let bad = Region::new(120.5, 30.0, 120.0, 30.5);
        assert!(bad.validate().is_err());

        let flat = Region::new(120.0, 30.0, 120.5, 30.0);
        assert!(flat.validate().is_err());
    }

    #[test]
    fn test_parse_external_field_names() {
        let json = r#"{
            "region": {"lon_min": 120.0, "lat_min": 35.0, "depth_min": 10.0,
                       "lon_max": 120.1, "lat_max": 35.1, "depth_max": 20.0},
            "spectrum": {"spectrum_model_type": "PM", "Hs": 1.5, "Tp": 6.0},
            "time": {"dt_backend": 0.1, "T_total": -1, "cache_retention_time": 1.0}
        }"#;
        let request = SimulationRequest::from_json_str(json).unwrap();
        assert_eq!(request.spectrum.hs, 1.5);
        assert_eq!(request.spectrum.tp, 6.0);
        assert_eq!(request.time.time_limit(), None);
        assert_eq!(request.time.cache_retention_time, Some(1.0));
        assert_eq!(request.wind.wind_direction_deg, 270.0);
    }

    #[test]
    fn test_unknown_model_fails_parse() {
        let json = r#"{
            "region": {"lon_min": 0.0, "lat_min": 0.0, "depth_min": 10.0,
                       "lon_max": 1.0, "lat_max": 1.0, "depth_max": 20.0},
            "spectrum": {"spectrum_model_type": "BRETSCHNEIDER"}
        }"#;
        assert!(matches!(
            SimulationRequest::from_json_str(json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_jonswap_parses() {
        let json = r#"{
            "region": {"lon_min": 0.0, "lat_min": 0.0, "depth_min": 10.0,
                       "lon_max": 1.0, "lat_max": 1.0, "depth_max": 20.0},
            "spectrum": {"spectrum_model_type": "JONSWAP", "gamma": 3.3}
        }"#;
        let request = SimulationRequest::from_json_str(json).unwrap();
        assert_eq!(request.spectrum.spectrum_model_type, SpectrumModel::Jonswap);
    }

    #[test]
    fn test_time_validation() {
        let mut time = TimeConfig::default();
        assert!(time.validate().is_ok());

        time.t_total = Some(0.0);
        assert!(time.validate().is_err());

        time.t_total = Some(-1.0);
        assert!(time.validate().is_ok());
        assert_eq!(time.time_limit(), None);

        time.cache_retention_time = Some(0.0);
        assert!(time.validate().is_err());

        let zero_dt = TimeConfig {
            dt_backend: 0.0,
            ..Default::default()
        };
        assert!(zero_dt.validate().is_err());
    }

    #[test]
    fn test_spectrum_ranges() {
        let mut spectrum = SpectrumConfig::default();
        spectrum.tp = 1.0;
        assert!(spectrum.validate().is_err());

        let mut spectrum = SpectrumConfig::default();
        spectrum.directional_spread_deg = 120.0;
        assert!(spectrum.validate().is_err());

        let mut spectrum = SpectrumConfig::default();
        spectrum.main_wave_direction_deg = Some(400.0);
        assert!(spectrum.validate().is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");

        let request = SimulationRequest::new(region())
            .with_spectrum(SpectrumConfig::default().with_seed(7))
            .with_time(TimeConfig::default().with_total(10.0));
        request.save_to_file(&path).unwrap();

        let loaded = SimulationRequest::from_file(&path).unwrap();
        assert_eq!(loaded, request);
    }
}
