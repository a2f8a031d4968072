//! Gateway 应用状态

use std::sync::Arc;

use crate::gemini::ModelClient;

/// Gateway 应用状态
///
/// 只读，请求之间不共享可变数据
#[derive(Clone)]
pub struct AppState {
    model: Arc<dyn ModelClient>,
}

impl AppState {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &dyn ModelClient {
        self.model.as_ref()
    }
}
