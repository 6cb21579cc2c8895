use rand::Rng;

/// Prefix given to schedule item ids
pub const ITEM_ID_PREFIX: &str = "schedule_item_";

const FRAGMENT_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates `prefix` followed by nine random base-36 characters
///
/// This is not a uniqueness guarantee. Persisted documents already carry ids
/// in this shape, so any stronger scheme has to keep reading them.
pub fn fresh_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let fragment: String = (0..FRAGMENT_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", prefix, fragment)
}
