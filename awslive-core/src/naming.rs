//! Test resource naming
//!
//! Every resource created by awslive is named `test-` followed by a random
//! integer, so that concurrent test runs do not collide and leftovers are
//! recognizable afterwards. SQS in particular keeps a deleted queue's name
//! reserved for a while, which is why a fresh random name is drawn for every
//! acquisition instead of reusing a fixed one.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use tracing::debug;

use crate::error::ApiError;

/// Prefix shared by all generated resource names.
pub const TEST_PREFIX: &str = "test-";

/// Closed lower bound of the random name draw.
pub const NAME_FLOOR: u64 = 1_000_000;

/// Open upper bound of the random name draw.
pub const NAME_CEIL: u64 = 10_000_000;

static TEST_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"test-[0-9]+$").expect("test name pattern"));

/// Draw a candidate resource name: the test prefix plus a uniformly random
/// integer in `[NAME_FLOOR, NAME_CEIL)`.
pub fn random_test_name() -> String {
    let number = rand::thread_rng().gen_range(NAME_FLOOR..NAME_CEIL);
    format!("{TEST_PREFIX}{number}")
}

/// Whether a remote identifier belongs to a generated test resource.
///
/// Remote identifiers (queue URLs, topic ARNs) embed the resource name as
/// their final path segment, so the pattern is anchored at the end.
pub fn is_test_resource(identifier: &str) -> bool {
    TEST_NAME_RE.is_match(identifier)
}

/// A remote resource kind that can be probed for name collisions.
///
/// Implementors supply `exists`; `generate_name` keeps drawing candidates
/// until the probe reports a free one. The check-then-create window is not
/// atomic against the remote service, so a collision remains possible in
/// principle, and an eventually-consistent listing may briefly miss a
/// just-created resource. Both are accepted for test-scoped names drawn from
/// a nine-million-wide range.
#[async_trait]
pub trait LiveResource {
    /// Whether a resource of this kind with the given name already exists.
    async fn exists(&self, name: &str) -> Result<bool, ApiError>;

    /// Generate a name that does not identify an existing resource.
    async fn generate_name(&self) -> Result<String, ApiError> {
        let mut name = random_test_name();
        while self.exists(&name).await? {
            debug!(name = %name, "generated name already taken, redrawing");
            name = random_test_name();
        }
        Ok(name)
    }
}
