//! 基础设施层：仓储实现

pub mod persistence;
