//! REST 能力声明
//!
//! 控制器通过 [`RestfulController::CAPABILITIES`] 显式声明支持的约定动作，
//! 路由生成时直接读取，不做运行时类型探测。

use std::any::Any;

use bitflags::bitflags;

bitflags! {
    /// 控制器支持的 REST 约定动作
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RestCapabilities: u8 {
        /// `new` + `create`
        const CREATE = 0x01;
        /// `edit` + `update`
        const UPDATE = 0x02;
        /// `destroy`
        const DESTROY = 0x04;
        /// `show`
        const DETAILS = 0x08;
        /// `index`
        const LIST = 0x10;
    }
}

impl RestCapabilities {
    pub fn supports_create(self) -> bool {
        self.contains(Self::CREATE)
    }

    pub fn supports_update(self) -> bool {
        self.contains(Self::UPDATE)
    }

    pub fn supports_destroy(self) -> bool {
        self.contains(Self::DESTROY)
    }

    pub fn supports_details(self) -> bool {
        self.contains(Self::DETAILS)
    }

    pub fn supports_list(self) -> bool {
        self.contains(Self::LIST)
    }
}

/// REST 风格控制器
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct ProductsController;
///
/// impl RestfulController for ProductsController {
///     const CAPABILITIES: RestCapabilities = RestCapabilities::all();
/// }
/// ```
pub trait RestfulController: Any + Send + Sync {
    const CAPABILITIES: RestCapabilities;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_queries() {
        let caps = RestCapabilities::CREATE | RestCapabilities::LIST;

        assert!(caps.supports_create());
        assert!(caps.supports_list());
        assert!(!caps.supports_update());
        assert!(!caps.supports_destroy());
        assert!(!caps.supports_details());
        assert!(RestCapabilities::default().is_empty());
        assert!(RestCapabilities::all().supports_details());
    }
}
