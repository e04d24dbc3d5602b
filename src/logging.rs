/// Thin facade over [`logger::Logger`], renamed for this crate: reads
/// `BEAGLE_LOG` (via `logger`'s own `Env` filter) instead of `GRUPS_LOG`.
pub fn init(verbosity: u8) {
    logger::Logger::init(verbosity);
}

pub fn set_level(verbosity: u8) {
    logger::Logger::set_level(verbosity);
}
