// apps/we_cli/src/commands/mod.rs

//! 子命令实现

pub mod batch;
pub mod info;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use we_config::{EngineConfig, SimulationRequest};

/// 读取并校验请求文件
pub fn load_request(path: &Path) -> Result<SimulationRequest> {
    let request = SimulationRequest::from_file(path)
        .with_context(|| format!("无法读取请求文件: {}", path.display()))?;
    request
        .validate()
        .with_context(|| format!("请求无效: {}", path.display()))?;
    Ok(request)
}

/// 读取引擎配置，未指定时使用默认值
pub fn load_engine(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::from_file(p)
            .with_context(|| format!("无法读取引擎配置: {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use we_config::Region;

    #[test]
    fn test_load_request_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("req.json");
        SimulationRequest::new(Region::new(120.0, 30.0, 120.5, 30.5))
            .save_to_file(&path)
            .unwrap();
        let request = load_request(&path).unwrap();
        assert_eq!(request.region.lon_max, 120.5);
    }

    #[test]
    fn test_load_request_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"region\": 1}}").unwrap();
        assert!(load_request(file.path()).is_err());
    }

    #[test]
    fn test_load_engine_default() {
        assert_eq!(load_engine(None).unwrap(), EngineConfig::default());
    }
}
