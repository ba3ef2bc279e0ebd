//! Shortcut binding, persistence and launch through the core facade

use super::fixtures::*;
use crate::config::Directories;
use crate::{Error, ErrorKind, SlotLaunch, YamCore};
use yam_types::{DefaultAction, Notice, TargetRef};

#[test]
fn test_bind_and_launch_app() {
    let (_platform, mut core) = make_core(Default::default());
    core.bind_shortcut(0, "Calc", TargetRef::app("pkgA/.Calculator", 0))
        .unwrap();

    let SlotLaunch::App(handle) = core.launch_slot(0).unwrap() else {
        panic!("expected app launch");
    };
    assert_eq!(handle.component, "pkgA/.Calculator");
}

#[test]
fn test_bind_from_filter_result() {
    let (_platform, mut core) = make_core(Default::default());
    let result = core.binding_candidates("mail", yam_types::ActiveView::Apps);
    let target = &result.items().unwrap().apps().unwrap()[0];

    core.bind_shortcut(1, target.display_label(), TargetRef::from(target))
        .unwrap();
    let slot = core.shortcut(1).unwrap();
    assert_eq!(slot.label(), Some("Work Mail"));
    assert!(slot.target().unwrap().is_work_profile());
}

#[test]
fn test_blank_label_is_rejected_and_slot_unchanged() {
    let (_platform, mut core) = make_core(Default::default());
    core.bind_shortcut(3, "Mail", TargetRef::app("org.mail", 10))
        .unwrap();

    let err = core
        .bind_shortcut(3, "", TargetRef::app("pkgA/.Calculator", 0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.notice(), Some(Notice::EmptyLabel));
    assert_eq!(core.shortcut(3).unwrap().label(), Some("Mail"));
}

#[test]
fn test_uninstalled_app_keeps_binding() {
    let (platform, mut core) = make_core(Default::default());
    core.bind_shortcut(0, "Calc", TargetRef::app("pkgA/.Calculator", 0))
        .unwrap();
    platform.set_apps(vec![]);

    let err = core.launch_slot(0).unwrap_err();
    assert!(matches!(err, Error::ResolutionFailure(_)));
    assert_eq!(
        err.notice(),
        Some(Notice::LaunchFailed {
            target: "pkgA".to_string()
        })
    );
    assert!(core.shortcut(0).unwrap().is_bound());
}

#[test]
fn test_empty_slot_launch_gives_notice() {
    let (_platform, core) = make_core(Default::default());
    let err = core.launch_slot(2).unwrap_err();
    assert_eq!(err.notice(), Some(Notice::EmptySlot { index: 2 }));
}

#[test]
fn test_contact_slot() {
    let (_platform, mut core) = make_core(Default::default());
    core.bind_shortcut(1, "Mum", TargetRef::contact(1)).unwrap();
    assert_eq!(
        core.launch_slot(1).unwrap(),
        SlotLaunch::Contact { contact_id: 1 }
    );
}

#[test]
fn test_lock_blocks_rebind_but_not_clear() {
    let (_platform, mut core) = make_core(Default::default());
    core.bind_shortcut(0, "Calc", TargetRef::app("pkgA", 0))
        .unwrap();
    core.set_shortcuts_locked(true).unwrap();

    let err = core.rename_shortcut(0, "Sums").unwrap_err();
    assert_eq!(err.notice(), Some(Notice::ShortcutsLocked));
    assert!(core.launch_slot(0).is_ok());

    core.clear_shortcut(0).unwrap();
    assert!(!core.shortcut(0).unwrap().is_bound());
}

#[test]
fn test_visible_shortcuts_follow_count() {
    let (_platform, core) = make_core(config_with(|c| c.shortcuts.count = 2));
    assert_eq!(core.visible_shortcuts().len(), 2);
    assert_eq!(core.shortcuts().len(), 8);
}

#[test]
fn test_default_actions() {
    let (_platform, core) = make_core(Default::default());
    let handle = core.launch_default(&DefaultAction::Calendar).unwrap();
    assert_eq!(handle.component, "pkgB/.Calendar");

    let err = core.launch_default(&DefaultAction::Clock).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatchingDefaultApp);
    assert_eq!(
        err.notice(),
        Some(Notice::NoDefaultApp {
            action: DefaultAction::Clock
        })
    );
}

#[test]
fn test_slots_survive_restart() {
    let (temp_dir, platform, mut core) = make_file_core();
    core.bind_shortcut(0, "Calc", TargetRef::app("pkgA/.Calculator", 0))
        .unwrap();
    core.bind_shortcut(1, "Mum", TargetRef::contact(1)).unwrap();
    core.rename_shortcut(0, "Sums").unwrap();
    core.set_shortcuts_locked(true).unwrap();
    drop(core);

    let reopened = YamCore::new(
        platform,
        Directories::with_base(temp_dir.path().to_path_buf()),
    )
    .unwrap();
    assert_eq!(reopened.shortcut(0).unwrap().label(), Some("Sums"));
    assert_eq!(
        reopened.shortcut(1).unwrap().target(),
        Some(&TargetRef::contact(1))
    );
    assert!(reopened.shortcuts_locked());
}

#[test]
fn test_raised_capacity_applies_without_restart() {
    let (_platform, mut core) = make_core(Default::default());
    core.update_config(|c| {
        c.shortcuts.capacity = 12;
        c.shortcuts.count = 12;
    })
    .unwrap();

    assert_eq!(core.shortcuts().len(), 12);
    assert_eq!(core.visible_shortcuts().len(), 12);
    assert!(!core.shortcut(10).unwrap().is_bound());

    core.bind_shortcut(10, "Mail", TargetRef::app("org.mail/.Inbox", 10))
        .unwrap();
    assert_eq!(core.shortcut(10).unwrap().label(), Some("Mail"));
    assert!(core.shortcut(12).is_err());
}

#[test]
fn test_lowered_capacity_keeps_bindings() {
    let (_platform, mut core) = make_core(Default::default());
    core.bind_shortcut(7, "Calc", TargetRef::app("pkgA/.Calculator", 0))
        .unwrap();
    core.update_config(|c| c.shortcuts.capacity = 4).unwrap();

    assert_eq!(core.shortcuts().len(), 8);
    assert_eq!(core.shortcut(7).unwrap().label(), Some("Calc"));
}

#[test]
fn test_reloaded_capacity_is_persisted_with_next_edit() {
    let (temp_dir, platform, mut core) = make_file_core();
    std::fs::write(
        temp_dir.path().join("config.json"),
        r#"{ "shortcuts": { "capacity": 10 } }"#,
    )
    .unwrap();
    core.reload_config().unwrap();

    core.bind_shortcut(9, "Mum", TargetRef::contact(1)).unwrap();
    drop(core);

    let reopened = YamCore::new(
        platform,
        Directories::with_base(temp_dir.path().to_path_buf()),
    )
    .unwrap();
    assert_eq!(reopened.shortcut(9).unwrap().label(), Some("Mum"));
}
