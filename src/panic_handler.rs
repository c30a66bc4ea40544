use std::panic;

/// Install the panic hook: readable backtraces in debug builds, a crash
/// report in release builds. The panic is logged before either runs.
pub fn initialize_panic_handler() {
    if cfg!(debug_assertions) {
        better_panic::install();
    } else {
        human_panic::setup_panic!();
    }

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        log::error!("panic: {panic_info}");
        default_hook(panic_info);
    }));
}
