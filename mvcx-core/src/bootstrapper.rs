//! 启动任务管道
//!
//! 按注册顺序执行的一组启动期配置任务，每个任务通过
//! [`TaskContinuation`] 决定后续任务是否继续执行。

use anyhow::Context;

use crate::error::Result;

/// 任务执行后的后续动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskContinuation {
    /// 继续执行下一个任务
    #[default]
    Continue,

    /// 跳过紧随其后的一个任务
    Skip,

    /// 停止执行剩余的所有任务
    Break,
}

/// 启动任务
pub trait BootstrapperTask: Send + Sync {
    /// 任务名称（用于日志和错误上下文）
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// 执行任务，返回后续动作
    fn execute(&self) -> Result<TaskContinuation>;
}

/// 启动任务执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// 已执行的任务
    pub executed: Vec<String>,

    /// 被跳过或因 Break 而未执行的任务
    pub skipped: Vec<String>,
}

/// 启动器 - 按顺序执行任务
#[derive(Default)]
pub struct Bootstrapper {
    tasks: Vec<Box<dyn BootstrapperTask>>,
}

impl Bootstrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加任务
    pub fn task<T: BootstrapperTask + 'static>(mut self, task: T) -> Self {
        self.add_task(Box::new(task));
        self
    }

    /// 追加已装箱的任务
    pub fn add_task(&mut self, task: Box<dyn BootstrapperTask>) {
        tracing::debug!("Registering bootstrapper task: {}", task.name());
        self.tasks.push(task);
    }

    /// 已注册的任务数量
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 执行所有任务
    ///
    /// 任务失败时立即返回错误，不会执行剩余任务。
    pub fn run(&self) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();
        let mut skip_next = false;
        let mut tasks = self.tasks.iter();

        while let Some(task) = tasks.next() {
            if skip_next {
                tracing::debug!("Skipping bootstrapper task: {}", task.name());
                report.skipped.push(task.name().to_string());
                skip_next = false;
                continue;
            }

            tracing::info!("Executing bootstrapper task: {}", task.name());
            let continuation = task
                .execute()
                .with_context(|| format!("Bootstrapper task '{}' failed", task.name()))?;
            report.executed.push(task.name().to_string());

            match continuation {
                TaskContinuation::Continue => {}
                TaskContinuation::Skip => skip_next = true,
                TaskContinuation::Break => {
                    tracing::info!("Bootstrapper task '{}' stopped the pipeline", task.name());
                    report
                        .skipped
                        .extend(tasks.by_ref().map(|remaining| remaining.name().to_string()));
                    break;
                }
            }
        }

        Ok(report)
    }
}
