/// 服务的生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// 单例 - 容器中只有一个实例
    #[default]
    Singleton,

    /// 瞬态 - 每次解析都创建新实例
    Transient,
}
