#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};
use tvue::App;

#[derive(Arbitrary, Debug)]
enum Binding {
    Interpolate,
    Text,
    Html,
    Model,
    Click { stop: bool, prevent: bool },
    Unknown(u8),
}

#[derive(Arbitrary, Debug)]
struct Input {
    keys: Vec<u8>,
    bindings: Vec<(Binding, u8)>,
    writes: Vec<(u8, String)>,
}

fn key(i: u8) -> String {
    format!("k{}", i % 4)
}

fn element(binding: &Binding, key: &str) -> String {
    match binding {
        Binding::Interpolate => format!("<span>{{{{ {key} }}}}</span>"),
        Binding::Text => format!("<span v-text=\"{key}\"></span>"),
        Binding::Html => format!("<div v-html=\"{key}\"></div>"),
        Binding::Model => format!("<input v-model=\"{key}\">"),
        Binding::Click { stop, prevent } => {
            let mut attr = String::from("@click");
            if *stop {
                attr.push_str(".stop");
            }
            if *prevent {
                attr.push_str(".prevent");
            }
            format!("<button {attr}=\"touch\"></button>")
        }
        Binding::Unknown(n) => format!("<p v-x{n}=\"{key}\"></p>"),
    }
}

fuzz_target!(|input: Input| {
    let mut data = Map::new();
    for &k in input.keys.iter().take(8) {
        data.insert(key(k), Value::String(String::new()));
    }

    let mut template = String::from("<main>");
    for (binding, k) in input.bindings.iter().take(32) {
        template.push_str(&element(binding, &key(*k)));
    }
    template.push_str("</main>");

    let Ok(app) = App::builder()
        .data(Value::Object(data))
        .template(template)
        .method("touch", |_| {})
        .build()
    else {
        return;
    };

    for (k, value) in input.writes.iter().take(64) {
        let key = key(*k);
        if app.set(&key, value.as_str()).is_ok() {
            // Every write leaves a readable property behind.
            assert_eq!(app.get(&key).map(|v| v.to_string()).ok(), Some(value.clone()));
        }
    }
    for button in app.root().children() {
        if button.tag() == "button" {
            let _ = button.click();
        }
    }
});
