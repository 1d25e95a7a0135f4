//! # update-checker
//!
//! A library for checking SpigotMC, Modrinth and GitHub release APIs for a
//! version newer than the one installed locally.
//!
//! Every check resolves to a [`CheckResult`] carrying exactly one
//! [`CheckOutcome`]; network and format failures are classified rather than
//! returned as errors.
//!
//! ## Example
//!
//! ```no_run
//! use update_checker::{CheckOutcome, Platform, UpdateChecker, UpdateCheckerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = UpdateChecker::new("1.4.0", UpdateCheckerConfig::new())?;
//!
//!     // Runs on a worker task; awaiting the handle never fails.
//!     let result = checker.check("owner/repo", Platform::GitHub)?.await;
//!
//!     match result.outcome() {
//!         CheckOutcome::NewUpdateAvailable => {
//!             println!("Update available: {}", result.latest_known_version());
//!         }
//!         CheckOutcome::UpToDate => println!("Up to date"),
//!         other => println!("Check did not succeed: {:?}", other),
//!     }
//!
//!     // Spigot resources are identified by number.
//!     let spigot = checker.check(12345, Platform::Spigot)?.await;
//!     println!("Spigot reports {}", spigot.fetched_version());
//!
//!     Ok(())
//! }
//! ```

mod checker;
mod error;
mod platform;
mod scheme;
mod types;

pub use checker::{PendingCheck, UpdateChecker};
pub use error::{CheckError, Fault, MalformedResponse, Result};
pub use platform::Platform;
pub use scheme::{DecimalScheme, SemverScheme, VersionScheme};
pub use types::{CheckOutcome, CheckResult, UpdateCheckerConfig, USER_AGENT};
