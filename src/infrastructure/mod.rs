//! 基础设施层
//!
//! 与外部容器对接的适配层

pub mod container;

pub use container::{ContainerAdapter, ServiceCollection, ServiceLifetime};
