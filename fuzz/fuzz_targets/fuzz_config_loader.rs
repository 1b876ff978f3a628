#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Loading never panics; anything that loads must serialize and load back.
    if let Ok(cfg) = tower_config::from_json_str(data) {
        let json = cfg.to_json_pretty().unwrap();
        let again = tower_config::from_json_str(&json);
        assert!(again.is_ok(), "{json}");
    }
});
