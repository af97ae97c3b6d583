//! 编译模块：将原始规则清单编译为可执行的提供方规则
pub mod provider;
pub mod compiler;

pub use self::provider::ProviderRule;
pub use self::compiler::ManifestCompiler;
