use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::{Map, Value, json};

/// Fixed so every bench run renders the same data.
const SEED: u64 = 0x5eed;

fn word(rng: &mut StdRng, len: std::ops::RangeInclusive<usize>) -> String {
    let len = rng.random_range(len);
    (0..len)
        .map(|_| char::from(rng.random_range(b'a'..=b'z')))
        .collect()
}

/// Data for `template.mustache`: dotted lookups under `user` and
/// `user.address`, a list of items, and flags that are sometimes absent so
/// inverted sections see missing keys as well as `false`.
pub fn profile_contexts(n: usize) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..n)
        .map(|_| {
            let mut user = Map::new();
            user.insert("name".into(), word(&mut rng, 5..=10).into());
            user.insert("age".into(), rng.random_range(18..80u32).into());
            user.insert(
                "address".into(),
                json!({"city": word(&mut rng, 4..=9), "zip": rng.random_range(1000..9999u32)}),
            );
            if rng.random_bool(0.7) {
                user.insert("active".into(), rng.random_bool(0.8).into());
            }

            let items: Vec<Value> = (0..rng.random_range(3..10usize))
                .map(|_| {
                    json!({
                        "name": format!("<{}>", word(&mut rng, 3..=8)),
                        "value": rng.random_range(10..1000u32),
                        "special": rng.random_bool(0.3),
                    })
                })
                .collect();

            json!({
                "user": user,
                "items": items,
                "show_details": rng.random_bool(0.8),
                "has_access": rng.random_bool(0.6),
            })
        })
        .collect()
}

/// A `name`/`kids` tree for the recursive partials. Every node carries a
/// `kids` array so lookups never fall through to an ancestor's children.
pub fn tree_context(depth: usize, fanout: usize) -> Value {
    fn node(rng: &mut StdRng, depth: usize, fanout: usize) -> Value {
        let kids: Vec<Value> = if depth == 0 {
            Vec::new()
        } else {
            (0..fanout).map(|_| node(rng, depth.saturating_sub(1), fanout)).collect()
        };
        json!({"name": word(rng, 2..=6), "kids": kids})
    }
    node(&mut StdRng::seed_from_u64(SEED), depth, fanout)
}
