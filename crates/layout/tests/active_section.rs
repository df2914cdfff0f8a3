use proptest::prelude::*;
use snapdeck_layout::{active_section, Child, ContainerConfig, SectionBounds, SectionContainer};

proptest! {
    #[test]
    fn scrolled_to_section_start_selects_that_section(
        count in 1usize..24,
        length in 100.0f64..2000.0,
        pick in 0usize..24,
    ) {
        let k = pick % count;
        let sections = SectionBounds::evenly_spaced(count, length, 0.0);
        prop_assert_eq!(active_section(&sections, k as f64 * length, length), Some(k));
    }

    #[test]
    fn small_drift_keeps_the_section(
        count in 1usize..12,
        length in 200.0f64..1200.0,
        pick in 0usize..12,
        drift in -0.49f64..0.49,
    ) {
        let k = pick % count;
        let sections = SectionBounds::evenly_spaced(count, length, 0.0);
        let offset = (k as f64 + drift) * length;
        prop_assert_eq!(active_section(&sections, offset, length), Some(k));
    }

    #[test]
    fn container_reports_each_change_once(
        offsets in proptest::collection::vec(0.0f64..4000.0, 1..40),
    ) {
        let mut container = SectionContainer::new(
            ContainerConfig::default(),
            (0..5).map(Child::section).collect(),
        );
        container.mount(SectionBounds::evenly_spaced(5, 800.0, 0.0));

        let mut previous = container.active_index();
        for offset in offsets {
            let changed = container.on_scroll(offset, 800.0);
            let current = container.active_index();
            prop_assert!(current < 5);
            match changed {
                Some(index) => {
                    prop_assert_ne!(index, previous);
                    prop_assert_eq!(index, current);
                }
                None => prop_assert_eq!(current, previous),
            }
            previous = current;
        }
    }
}

#[test]
fn empty_container_ignores_scroll() {
    let mut container: SectionContainer<()> =
        SectionContainer::new(ContainerConfig::default(), Vec::new());
    assert_eq!(container.on_scroll(1234.0, 800.0), None);
    assert_eq!(active_section(&[], 0.0, 800.0), None);
}
