use log::LevelFilter;

/// Install the logger for the current target.
///
/// On wasm32 this routes `log` to the browser console and installs the panic
/// hook; elsewhere it uses `env_logger`, which still honours `RUST_LOG`.
/// Repeated calls keep the first logger.
pub fn init(level: LevelFilter) {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            console_error_panic_hook::set_once();
            if let Some(level) = level.to_level() {
                console_log::init_with_level(level).ok();
            }
        } else {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .try_init()
                .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(LevelFilter::Warn);
        init(LevelFilter::Debug);
        log::warn!("logger initialised");
    }
}
