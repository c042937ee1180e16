use std::collections::HashMap;
use std::sync::Arc;

use super::*;

#[test]
fn test_round_robin_wraps() {
    let pool = KeyPool::new("cohere", ["a", "b", "c"]).unwrap();
    let seen: Vec<&str> = (0..5).map(|_| pool.next_key()).collect();
    assert_eq!(seen, vec!["a", "b", "c", "a", "b"]);
}

#[test]
fn test_single_key_always_returned() {
    let pool = KeyPool::new("gemini", ["only"]).unwrap();
    for _ in 0..3 {
        assert_eq!(pool.next_key(), "only");
    }
}

#[test]
fn test_empty_pool_is_config_error() {
    let err = KeyPool::new("cohere", Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, RagErr::EmptyCredentialPool { ref service } if service == "cohere"));
}

#[test]
fn test_from_csv_trims_and_drops_blanks() {
    let pool = KeyPool::from_csv("gemini", " k1 , ,k2,").unwrap();
    assert_eq!(pool.next_key(), "k1");
    assert_eq!(pool.next_key(), "k2");
    assert_eq!(pool.next_key(), "k1");

    assert!(KeyPool::from_csv("gemini", " , ").is_err());
    assert!(KeyPool::from_csv("gemini", "").is_err());
}

#[test]
fn test_concurrent_callers_share_rotation_evenly() {
    let pool = Arc::new(KeyPool::new("cohere", ["a", "b", "c"]).unwrap());
    let threads = 8;
    let per_thread = 300;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || {
                (0..per_thread)
                    .map(|_| pool.next_key().to_string())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for handle in handles {
        for key in handle.join().unwrap() {
            *counts.entry(key).or_default() += 1;
        }
    }

    // 2400 calls over 3 keys: every index was advanced exactly once per call.
    assert_eq!(counts.get("a"), Some(&800));
    assert_eq!(counts.get("b"), Some(&800));
    assert_eq!(counts.get("c"), Some(&800));
}

#[test]
fn test_debug_hides_keys() {
    let pool = KeyPool::new("cohere", ["secret-key"]).unwrap();
    let debug = format!("{pool:?}");
    assert!(!debug.contains("secret-key"));
    assert!(debug.contains("cohere"));
}

#[test]
fn test_redact() {
    assert_eq!(redact("abcdefgh"), "****efgh");
    assert_eq!(redact("abc"), "****");
}
