//! Request and response body types shared by all storage providers.

mod content;
mod stat;
mod stream;

pub use content::{ByteStream, ObjectContent};
pub use stat::ObjectStat;
pub use stream::ObjectStream;
