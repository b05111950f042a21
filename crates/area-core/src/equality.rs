//! Route equality and cache keys
//!
//! [`same_route`] decides whether a navigation would re-mount what an area
//! already shows. [`cache_key`] condenses a route into a short string for
//! render memoization. Both are heuristics: collisions and false negatives
//! cost an extra render, nothing more.

use serde_json::{Map, Value};

use crate::component::{get_tag_name, same_component, ComponentRef};
use crate::route::RouteIdentity;

/// Tag segment used in cache keys when the component cannot be identified
pub const UNKNOWN_TAG: &str = "unknown";

/// Lowercase and strip everything that is not alphanumeric
pub fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Component comparison used for routes
///
/// Tag names compare after normalization. References whose tag cannot be
/// resolved never compare equal.
pub fn same_route_component(a: &ComponentRef, b: &ComponentRef) -> bool {
    if let (ComponentRef::TagName(x), ComponentRef::TagName(y)) = (a, b) {
        let (x, y) = (normalize_tag(x), normalize_tag(y));
        return !x.is_empty() && x == y;
    }

    if get_tag_name(a).is_none() || get_tag_name(b).is_none() {
        return false;
    }

    same_component(a, b)
}

/// Whether two routes target the same area, component, state and params
pub fn same_route<A, B>(a: &A, b: &B) -> bool
where
    A: RouteIdentity + ?Sized,
    B: RouteIdentity + ?Sized,
{
    a.area() == b.area()
        && same_route_component(a.component(), b.component())
        && stringify(a.state()) == stringify(b.state())
        && stringify(a.params()) == stringify(b.params())
}

/// Derive `area:tag:stateHash:paramsHash` for a route
pub fn cache_key<R: RouteIdentity + ?Sized>(route: &R) -> String {
    let tag = get_tag_name(route.component()).unwrap_or_else(|| UNKNOWN_TAG.to_string());
    format!(
        "{}:{}:{}:{}",
        route.area(),
        tag,
        to_base36(rolling_hash(&stringify(route.state()))),
        to_base36(rolling_hash(&stringify(route.params()))),
    )
}

/// Canonical JSON of a map; the map is key-ordered so equal maps stringify equally
fn stringify(map: &Map<String, Value>) -> String {
    Value::Object(map.clone()).to_string()
}

/// 32-bit multiplicative rolling hash (`h * 31 + unit`) over UTF-16 code units
pub fn rolling_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(unit as i32))
}

/// Base-36 rendering of a signed hash, with a leading `-` for negatives
pub fn to_base36(value: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = value.unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}
