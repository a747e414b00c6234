#![no_main]

use easel_resources::adapters::Palette;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(palette) = Palette::parse_gpl(text) {
        let cfg = palette.to_configuration();
        let back = Palette::from_configuration(&cfg).expect("flattened palette must decode");
        assert_eq!(palette, back);
    }
});
