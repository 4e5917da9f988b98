use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::{RenderFrame, Renderer};

use super::Container;

pub const RENDER_FRAME_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrameJsonContractV1 {
    pub schema_version: u32,
    pub frame: RenderFrame,
}

impl RenderFrame {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize frame json: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = RenderFrameJsonContractV1 {
            schema_version: RENDER_FRAME_JSON_SCHEMA_V1,
            frame: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize frame contract v1: {e}"))
        })
    }

    /// Accepts either a bare frame or a versioned v1 payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        let frame = if let Ok(frame) = serde_json::from_str::<RenderFrame>(input) {
            frame
        } else {
            let payload: RenderFrameJsonContractV1 = serde_json::from_str(input).map_err(|e| {
                ChartError::InvalidData(format!("failed to parse frame json payload: {e}"))
            })?;
            if payload.schema_version != RENDER_FRAME_JSON_SCHEMA_V1 {
                return Err(ChartError::InvalidData(format!(
                    "unsupported frame schema version: {}",
                    payload.schema_version
                )));
            }
            payload.frame
        };
        frame.validate()?;
        Ok(frame)
    }
}

impl<R: Renderer> Container<R> {
    /// Frame at `now_ms` as a versioned JSON payload.
    pub fn frame_json_contract_v1_pretty(&self, now_ms: f64) -> ChartResult<String> {
        let frame = self.frame(now_ms).ok_or_else(|| {
            ChartError::InvalidData("container has not been rendered yet".to_owned())
        })?;
        frame.to_json_contract_v1_pretty()
    }
}
