#![allow(dead_code, reason = "each test binary uses a subset of the fixtures")]

use mustachec::{Engine, Options};
use rand::Rng;

pub fn get_engine() -> Engine {
    Engine::new(Options::default())
}

pub fn generate_random_whitespace() -> String {
    let mut rng = rand::rng();
    let length = rng.random_range(0..10);
    (0..length)
        .map(|_| if rng.random_bool(0.2) { '\t' } else { ' ' })
        .collect()
}

pub fn generate_random_whitespace_at_least_one() -> String {
    let mut rng = rand::rng();
    let length = rng.random_range(1..10);
    (0..length).map(|_| ' ').collect()
}

/// A random name made of letters, digits and underscores.
pub fn generate_random_name() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_";
    let mut rng = rand::rng();
    let length = rng.random_range(1..12);
    let mut name = String::from("v");
    name.extend((0..length).map(|_| CHARS[rng.random_range(0..CHARS.len())] as char));
    name
}

/// Random text that never contains a tag opener.
pub fn generate_random_literal() -> String {
    const CHARS: &[u8] = b"abc XYZ<>&\"'\\\n\t{}#/^!=.";
    let mut rng = rand::rng();
    let length = rng.random_range(0..40);
    let mut text: String = (0..length)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect();
    while text.contains("{{") {
        text = text.replace("{{", "{ {");
    }
    text
}
