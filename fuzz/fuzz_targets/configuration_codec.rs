#![no_main]

use easel_config::{deserialize, serialize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(cfg) = deserialize(text) {
        let again = deserialize(&serialize(&cfg)).expect("serialized text must parse");
        assert_eq!(cfg, again);
    }
});
