mod support;

use scrollbind_core::{BindingConfig, BindingSlot, BindingState};
use support::{animator, config, options, pulse, Call, TestConfig};

#[test]
fn unchanged_config_does_not_rebind() {
    let (mut animator, world) = animator();
    let mut slot = BindingSlot::new();
    let cfg = config(1, 2, options("pinned-scrub"));

    assert!(slot.sync(&mut animator, &cfg).unwrap());
    assert!(!slot.sync(&mut animator, &cfg).unwrap());
    assert!(!slot.sync(&mut animator, &cfg.clone()).unwrap());
    assert_eq!(world.count(|c| matches!(c, Call::Load { .. })), 1);
    assert_eq!(animator.live_bindings(), 1);
}

#[test]
fn mounting_the_container_later_binds() {
    let (mut animator, world) = animator();
    let mut slot = BindingSlot::new();

    let unmounted: TestConfig = BindingConfig::new(pulse())
        .with_trigger(2)
        .with_options(options("defaults"));
    assert!(slot.sync(&mut animator, &unmounted).unwrap());
    assert_eq!(slot.handle(), None);
    assert!(world.calls().is_empty());

    // Re-render with the same absent container stays a no-op.
    assert!(!slot.sync(&mut animator, &unmounted).unwrap());

    let mounted = unmounted.clone().with_container(1);
    assert!(slot.sync(&mut animator, &mounted).unwrap());
    let handle = slot.handle().unwrap();
    assert_eq!(animator.state(handle), BindingState::Loading);
}

#[test]
fn changed_options_replace_the_binding() {
    let (mut animator, world) = animator();
    let mut slot = BindingSlot::new();

    let slow = config(1, 2, options("pinned-scrub"));
    slot.sync(&mut animator, &slow).unwrap();
    world.fire_ready();
    animator.pump().unwrap();
    let first = slot.handle().unwrap();

    let mut fast = slow.clone();
    fast.options.speed_factor = 2.0;
    assert!(slot.sync(&mut animator, &fast).unwrap());
    let second = slot.handle().unwrap();

    assert_ne!(first, second);
    assert_eq!(animator.state(first), BindingState::Unbound);
    assert_eq!(animator.live_bindings(), 1);
    assert_eq!(world.count(|c| matches!(c, Call::Revert { .. })), 1);
    assert_eq!(world.count(|c| matches!(c, Call::Dispose { .. })), 1);

    world.fire_ready();
    animator.pump().unwrap();
    world.scroll(0.25);
    animator.pump().unwrap();
    assert_eq!(animator.current_frame(second), Some(0.25 * 99.0 * 2.0));
}

#[test]
fn pausing_tears_down_and_resuming_binds_again() {
    let (mut animator, world) = animator();
    let mut slot = BindingSlot::new();

    let running = config(1, 2, options("defaults"));
    slot.sync(&mut animator, &running).unwrap();
    let mut paused = running.clone();
    paused.options.pause = true;

    assert!(slot.sync(&mut animator, &paused).unwrap());
    assert_eq!(slot.handle(), None);
    assert_eq!(animator.live_bindings(), 0);

    assert!(slot.sync(&mut animator, &running).unwrap());
    assert_eq!(animator.live_bindings(), 1);
    assert_eq!(world.count(|c| matches!(c, Call::Load { .. })), 2);
}

#[test]
fn release_unbinds_and_forgets() {
    let (mut animator, world) = animator();
    let mut slot = BindingSlot::new();
    let cfg = config(1, 2, options("defaults"));
    slot.sync(&mut animator, &cfg).unwrap();

    slot.release(&mut animator);
    slot.release(&mut animator);
    assert_eq!(slot.handle(), None);
    assert_eq!(animator.live_bindings(), 0);
    assert_eq!(world.count(|c| matches!(c, Call::Dispose { .. })), 1);

    // A released slot binds again even with the same config.
    assert!(slot.sync(&mut animator, &cfg).unwrap());
}
