use thiserror::Error;

/// 存储读取错误
///
/// 具体存储实现产生的错误词汇。组合层与装饰器原样传递这些错误，
/// 不做任何包装或重新分类。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("部署记录未找到: {deploy_id}")]
    DeployNotFound { deploy_id: String },
    #[error("存储后端错误: {0}")]
    Backend(String),
    #[error("无效的查询参数: {0}")]
    InvalidArgument(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("操作超时: {0}")]
    Timeout(String),
    #[error("存储不可用: {0}")]
    Unavailable(String),
    #[error("缓存错误: {0}")]
    Cache(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }
    pub fn deploy_not_found<S: Into<String>>(deploy_id: S) -> Self {
        Self::DeployNotFound {
            deploy_id: deploy_id.into(),
        }
    }
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        Self::Cache(msg.into())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::DeployNotFound { .. })
    }
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Backend(_) | StoreError::Timeout(_) | StoreError::Unavailable(_)
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// 存储门面组合错误
///
/// 只在组合阶段产生一次；组合成功后的任何调用都不会再返回此错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("缺少必需的存储委托: {store}")]
    MissingDelegate { store: &'static str },
}

impl CompositionError {
    pub fn missing(store: &'static str) -> Self {
        Self::MissingDelegate { store }
    }
}
