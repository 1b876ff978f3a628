#![no_main]
use libfuzzer_sys::fuzz_target;
use tower_core::{FieldRegistry, LightSchedule, ReadingAssembler, WaterLevel};
use tower_traits::FixedClock;

fuzz_target!(|data: &str| {
    let water = WaterLevel {
        sensor_height: 60.0,
        max_level: 40.0,
        min_level: 10.0,
    };
    let schedule = LightSchedule::from_hm((22, 0), (6, 0)).unwrap();
    let asm = ReadingAssembler::new(
        FieldRegistry::standard(water, schedule),
        "rhok",
        Default::default(),
        FixedClock::at(3, 0).unwrap(),
    );
    // Each position ends up stored, rejected or skipped; never more than one.
    if let Ok(a) = asm.assemble_line(data) {
        assert_eq!(a.record.fields.len() + a.rejected.len() + a.not_applicable, 9);
    }
});
