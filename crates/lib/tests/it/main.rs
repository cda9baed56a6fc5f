/*! Integration tests for Filefly.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - account: Account lifecycle, credentials and the administrator invariant
 * - backend: The BackendImpl contract, run against every engine
 * - preferences: Preference documents, scopes and the write-through cache
 * - queue: The FIFO access queue and its stuck-holder timeout
 * - store: Opening a Store, bootstrap and configuration
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("filefly=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod preferences;
mod queue;
mod store;
