pub mod desktop;
pub mod focus_switcher;
pub mod key_sequencer;
pub mod keycode_map;
pub mod window_cache;
pub mod window_locator;

pub use desktop::{create_desktop, Desktop, DesktopCall, DryRunDesktop, FakeWindow};
pub use focus_switcher::FocusSwitcher;
pub use key_sequencer::{FocusOutcome, KeyEventSequencer};
pub use keycode_map::KeycodeMap;
pub use window_cache::WindowCache;
pub use window_locator::WindowLocator;
