// 定位实现

use super::LocationProvider;
use crate::models::Location;
use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// 固定位置（用于车载网关配置或演示）
pub struct StaticLocationProvider {
    latitude: f64,
    longitude: f64,
}

impl StaticLocationProvider {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn current_location(&self) -> Result<Location> {
        Ok(Location {
            latitude: self.latitude,
            longitude: self.longitude,
            captured_at: chrono::Utc::now(),
        })
    }
}

/// 定位不可用（无权限或无设备）
pub struct UnavailableLocationProvider;

#[async_trait]
impl LocationProvider for UnavailableLocationProvider {
    async fn current_location(&self) -> Result<Location> {
        Err(anyhow!("定位不可用"))
    }
}
