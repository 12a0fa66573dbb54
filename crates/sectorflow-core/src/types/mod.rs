//! 서비스 전반에서 사용되는 공통 타입.

mod category;
mod record;
mod snapshot;

pub use category::*;
pub use record::*;
pub use snapshot::*;
