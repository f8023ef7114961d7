#![no_main]

use libfuzzer_sys::fuzz_target;
use tvue_view::{parse_fragment, parse_template};

fuzz_target!(|data: &[u8]| {
    let Ok(markup) = std::str::from_utf8(data) else {
        return;
    };

    let nodes = parse_fragment(markup);
    let serialized: String = nodes.iter().map(|n| n.outer_html()).collect();
    let _ = parse_fragment(&serialized);

    if let Ok(root) = parse_template(markup) {
        assert!(root.is_element());
        let _ = root.inner_html();
    }
});
