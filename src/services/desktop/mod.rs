//! Desktop backend: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for talking to the OS:
//! enumerating top-level windows, reading their state, changing focus and
//! injecting key events. Matching rules, caching and the modifier bracket
//! live in the services that consume the `Desktop` trait.
//!
//! The Alt bracket performed by `KeyEventSequencer` targets Windows, where a
//! bare Alt press-release activates the menu bar of the focused window. The
//! dry-run backend records the same events without that side effect.

mod dry_run;
#[cfg(windows)]
mod win32;
mod r#trait;

pub use self::dry_run::{DesktopCall, DryRunDesktop, FakeWindow};
pub use self::r#trait::{create_desktop, Desktop};
