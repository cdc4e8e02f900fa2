//! Process exit codes. Any fatal condition maps to `FAILURE`; there is no
//! finer taxonomy.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
