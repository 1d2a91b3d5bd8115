//! Release version parsing and ordering.
//!
//! Vendor release pages publish versions in a loose semantic-version dialect
//! (`0.12.3`, `1.2`, `0.6.0-rc1`, `0.1.0beta1`, `1.4.0+ent`). [`SemVer`]
//! accepts that dialect, keeps the original spelling for display, and orders
//! values by semantic-version precedence.
//!
//! # Ordering
//!
//! - `major.minor.patch` compare numerically
//! - a pre-release sorts before the release it qualifies
//! - pre-release identifiers compare numerically when both are numeric,
//!   lexically otherwise
//! - build metadata only breaks ties, so the order stays total

pub use self::error::{Result, VersionError};
pub use self::semver::SemVer;

mod error;
mod semver;
