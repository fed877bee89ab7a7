use rand::Rng;

const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A fresh random lowercase-alphanumeric token. Used for the `{random}`
/// filename placeholder and for unique temp-file names; random rather than
/// time-based so rapid sequential calls never collide.
pub fn random_token(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| TOKEN_CHARS[rng.gen_range(0..TOKEN_CHARS.len())] as char)
        .collect()
}
