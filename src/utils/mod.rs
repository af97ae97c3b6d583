//! 通用工具模块
pub mod clock;
pub mod link;
pub mod uri_decoder;

pub use self::clock::{Clock, SystemClock};
pub use self::link::{extract_link, is_url};
pub use self::uri_decoder::{UriDecoder, MAX_DECODE_ROUNDS};
