use vdom_patch_testhelpers::test;

#[test]
fn setup_installs_subscriber_once() {
    // the attribute already ran setup; a second call must be a no-op
    vdom_patch_testhelpers::setup();
    tracing::info!(answer = 42, "subscriber accepts events");
    let installed =
        tracing::dispatcher::get_default(|d| !d.is::<tracing::subscriber::NoSubscriber>());
    assert!(installed);
}

#[::core::prelude::rust_2024::test]
fn setup_without_the_attribute() {
    vdom_patch_testhelpers::setup();
    vdom_patch_testhelpers::setup();
    tracing::debug!("logged after repeated setup");
}
