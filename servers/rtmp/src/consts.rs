pub const DEFAULT_RTMP_PORT: u16 = 1935;
pub const DEFAULT_CHUNK_SIZE: u32 = 60000;
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PING_TIMEOUT_SECS: u64 = 60;

pub const READ_BUFFER_SIZE: usize = 4096;
