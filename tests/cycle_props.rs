//! Property tests for setting cycles.

use proptest::prelude::*;
use thermview::cycle::SettingCycle;
use thermview::driver::{AgcMode, ColorPalette, ShutterMode};

const NAMES: [&str; 12] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliett",
    "kilo", "lima",
];

fn cycle_of_len(len: usize) -> SettingCycle<usize> {
    SettingCycle::new(NAMES[..len].iter().map(|&n| (n, 0usize)).collect())
}

proptest! {
    #[test]
    fn prop_full_rotation_returns_to_start(len in 1usize..=12, start in 0usize..12) {
        let mut cycle = cycle_of_len(len);
        prop_assume!(start < len);
        cycle.select(NAMES[start]);
        let before = cycle.current_name();
        for _ in 0..cycle.len() {
            cycle.advance();
        }
        prop_assert_eq!(cycle.current_name(), before);
    }

    #[test]
    fn prop_advance_follows_entry_order(len in 1usize..=12, steps in 0usize..64) {
        let mut cycle = cycle_of_len(len);
        for _ in 0..steps {
            cycle.advance();
        }
        prop_assert_eq!(cycle.current_name(), NAMES[steps % len]);
    }

    #[test]
    fn prop_identical_cycles_stay_in_lockstep(len in 1usize..=12, steps in 0usize..64) {
        let mut a = cycle_of_len(len);
        let mut b = a.clone();
        for _ in 0..steps {
            a.advance();
            b.advance();
        }
        prop_assert_eq!(a.current_name(), b.current_name());
    }

    #[test]
    fn prop_select_pins_current_entry(len in 1usize..=12, pick in 0usize..12) {
        let mut cycle = cycle_of_len(len);
        prop_assume!(pick < len);
        prop_assert!(cycle.select(NAMES[pick]));
        prop_assert_eq!(cycle.current_name(), NAMES[pick]);
    }

    #[test]
    fn prop_palette_cycle_wraps_in_name_order(steps in 0usize..64) {
        let order = [
            "amber",
            "black-hot",
            "green",
            "hi",
            "iron",
            "prism",
            "spectra",
            "tyrian",
            "white-hot",
        ];
        let mut cycle = ColorPalette::cycle();
        prop_assert_eq!(cycle.len(), order.len());
        for _ in 0..steps {
            cycle.advance();
        }
        prop_assert_eq!(cycle.current_name(), order[steps % order.len()]);
    }

    #[test]
    fn prop_mode_cycles_alternate(steps in 0usize..32) {
        let mut agc = AgcMode::cycle();
        let mut shutter = ShutterMode::cycle();
        for _ in 0..steps {
            agc.advance();
            shutter.advance();
        }
        let agc_names = ["histeq", "linear"];
        let shutter_names = ["auto", "manual"];
        prop_assert_eq!(agc.current_name(), agc_names[steps % 2]);
        prop_assert_eq!(shutter.current_name(), shutter_names[steps % 2]);
    }
}
