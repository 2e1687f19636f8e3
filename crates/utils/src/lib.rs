use rand::Rng;

/// Generates a random alphanumeric secret of the given length.
/// Used for generated admin secrets and one-off broadcast tokens.
pub fn create_random_secret(secret_len: usize) -> String {
    let chars: Vec<char> = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
        .chars()
        .collect();
    let mut rng = rand::thread_rng();
    (0..secret_len)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_secret_of_wanted_length() {
        for len in &[0, 1, 16, 64] {
            assert_eq!(create_random_secret(*len).len(), *len);
        }
    }

    #[test]
    fn generates_distinct_secrets() {
        assert_ne!(create_random_secret(32), create_random_secret(32));
    }
}
