//! 启动任务：把验证管道注册到服务容器

use std::sync::Arc;

use mvcx_core::prelude::*;

use crate::configuration::ModelMetadataRegistry;
use crate::pipeline::ModelValidationPipeline;
use crate::provider::{CompositeValidatorProvider, FluentValidatorProvider, ModelValidatorProvider};

/// 组合提供者在容器中的名称
pub const MODEL_VALIDATOR_PROVIDER: &str = "modelValidatorProvider";

/// 元数据注册表在容器中的名称
pub const MODEL_METADATA_REGISTRY: &str = "modelMetadataRegistry";

/// 验证管道在容器中的名称
pub const MODEL_VALIDATION_PIPELINE: &str = "modelValidationPipeline";

/// 注册验证相关服务
///
/// 组合提供者的顺序固定为：流式配置提供者在前，额外提供者按添加顺序在后。
pub struct RegisterValidation {
    container: Arc<dyn ContainerAdapter>,
    registry: Arc<ModelMetadataRegistry>,
    providers: Vec<Arc<dyn ModelValidatorProvider>>,
}

impl RegisterValidation {
    pub fn new(container: Arc<dyn ContainerAdapter>, registry: Arc<ModelMetadataRegistry>) -> Self {
        Self {
            container,
            registry,
            providers: Vec::new(),
        }
    }

    /// 追加上游提供者
    pub fn provider(mut self, provider: Arc<dyn ModelValidatorProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

impl BootstrapperTask for RegisterValidation {
    fn name(&self) -> &str {
        "RegisterValidation"
    }

    fn execute(&self) -> Result<TaskContinuation> {
        let mut providers: Vec<Arc<dyn ModelValidatorProvider>> =
            vec![Arc::new(FluentValidatorProvider::new(Arc::clone(&self.registry)))];
        providers.extend(self.providers.iter().cloned());

        let composite = Arc::new(CompositeValidatorProvider::new(providers));
        let pipeline = Arc::new(ModelValidationPipeline::new(
            Arc::clone(&self.registry),
            Arc::clone(&composite),
        ));

        self.container
            .register_instance(MODEL_METADATA_REGISTRY, Arc::clone(&self.registry))?;
        self.container
            .register_instance(MODEL_VALIDATOR_PROVIDER, Arc::clone(&composite))?;
        self.container
            .register_instance(MODEL_VALIDATION_PIPELINE, pipeline)?;

        tracing::info!(
            "Registered model validation with {} provider(s) for {} model type(s)",
            composite.providers().len(),
            self.registry.len()
        );
        Ok(TaskContinuation::Continue)
    }
}
