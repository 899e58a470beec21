//! zcompare - 双视图文本比较核心库
//!
//! 模块结构：
//! - models: 数据模型（DiffMask, AlignmentInfo, 视图/文档标识）
//! - kernel::compare: 比较会话（比较对登记表、删除段账本、延时任务、对齐与滚动同步）
//! - kernel::services: 端口（宿主、diff 引擎、提示、配置）与适配器

pub mod kernel;
pub mod models;
