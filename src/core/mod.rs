//! 核心基础设施：领域错误与可注入随机源

pub mod error;
pub mod random;

pub use error::{HiveError, HiveResult};
pub use random::{EntropyRandom, FixedRandom, RandomSource, SeededRandom};
