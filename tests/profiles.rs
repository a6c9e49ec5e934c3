use display_profiles::codec::{decode_profile_list, encode_profile_list};
use display_profiles::modes::Mode;
use display_profiles::monitor::{Crtc, Output};
use display_profiles::profile::{OutputEntry, Profile};
use display_profiles::reconcile::{
    build_apply_request, current_profile, equals, is_feasible, ReconcileError,
};
use display_profiles::resources::Resources;
use display_profiles::snapshot::HardwareSnapshot;

fn entry(name: &str, x: i32, primary: bool) -> OutputEntry {
    OutputEntry {
        name: name.to_owned(),
        display_name: format!("{name} monitor"),
        x,
        y: 0,
        width: 1920,
        height: 1080,
        refresh_rate: 60,
        rotation: 1,
        primary,
    }
}

fn three_monitor_profile() -> Profile {
    Profile {
        name: "Wall".into(),
        clone: false,
        outputs: vec![
            entry("DP-1", 0, true),
            entry("DP-2", 1920, false),
            entry("DP-3", 3840, false),
        ],
    }
}

fn two_slot_snapshot(primary: bool) -> Resources {
    let output = |id: u32, name: &str, crtc: u32| Output {
        id,
        name: name.to_owned(),
        display_name: format!("{name} monitor"),
        connected: true,
        crtc: Some(crtc),
        possible_crtcs: vec![100, 101],
        modes: vec![1],
        primary,
    };
    Resources::new(
        40,
        vec![
            Crtc {
                id: 100,
                x: 0,
                y: 0,
                mode: Some(1),
                transform: 0,
            },
            Crtc {
                id: 101,
                x: 1920,
                y: 0,
                mode: Some(1),
                transform: 0,
            },
        ],
        vec![output(1, "DP-1", 100), output(2, "DP-2", 101)],
        vec![Mode::new(1, 1920, 1080, 60.0)],
    )
}

#[test]
fn list_round_trip_is_stable() {
    let mut mirrored = three_monitor_profile();
    mirrored.name = "Mirror".into();
    mirrored.clone = true;
    for output in &mut mirrored.outputs {
        output.x = 0;
    }
    let list = vec![three_monitor_profile(), Profile::new("Blank"), mirrored];

    let encoded = encode_profile_list(&list);
    let decoded = decode_profile_list(&encoded);
    assert_eq!(decoded, list);
    assert_eq!(encode_profile_list(&decoded), encoded);
}

#[test]
fn office_scenario_reencodes_exactly() {
    let raw = "Office||false||eDP-1|Built-in|0|0|1920|1080|60|0|true";
    let list = decode_profile_list(raw);
    assert_eq!(list.len(), 1);
    assert_eq!(encode_profile_list(&list), raw);
}

#[test]
fn equality_survives_any_permutation() {
    let profile = three_monitor_profile();
    let n = profile.outputs.len();
    for rotate in 0..n {
        let mut permuted = profile.clone();
        permuted.outputs.rotate_left(rotate);
        assert!(equals(&profile, &permuted));
        permuted.outputs.swap(0, n - 1);
        assert!(equals(&profile, &permuted));
    }
}

#[test]
fn empty_profile_is_always_feasible() {
    assert!(is_feasible(&Profile::new("Nothing"), &two_slot_snapshot(true)));
    assert!(is_feasible(
        &Profile::new("Nothing"),
        &Resources::new(0, vec![], vec![], vec![])
    ));
}

#[test]
fn missing_primary_is_repaired_on_first_output() {
    let current = current_profile(&two_slot_snapshot(false));
    let primaries: Vec<bool> = current.outputs.iter().map(|o| o.primary).collect();
    assert_eq!(primaries, [true, false]);
}

#[test]
fn three_outputs_on_two_slots_is_unsatisfiable() {
    assert_eq!(
        build_apply_request(&three_monitor_profile(), &two_slot_snapshot(true)),
        Err(ReconcileError::TooManyOutputs {
            required: 3,
            available: 2
        })
    );
}

#[test]
fn request_only_references_snapshot_outputs() {
    let snapshot = two_slot_snapshot(true);
    let mut profile = three_monitor_profile();
    profile.outputs.truncate(2);
    profile.outputs[1].name = "HDMI-9".into();

    let request = build_apply_request(&profile, &snapshot).unwrap();
    let known: Vec<u32> = snapshot.outputs().iter().map(|o| o.id).collect();
    assert!(request.outputs.iter().all(|o| known.contains(&o.output)));
    assert!(request
        .crtcs
        .iter()
        .flat_map(|c| c.outputs.iter())
        .all(|id| known.contains(id)));
    assert_eq!(request.serial, snapshot.serial());
}
