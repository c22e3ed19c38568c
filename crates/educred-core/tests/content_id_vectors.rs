//! # Content Identifier Test Vectors
//!
//! Fixed inputs with their expected canonical bytes, SHA-256 digests and
//! base58 multihash identifiers. The vectors were computed independently of
//! this crate (JCS-sorted compact JSON, `hashlib.sha256`, base58btc over
//! `0x12 0x20 || digest`), so any drift in canonicalization or encoding shows
//! up here first.

use educred_core::{sha256_bytes, sha256_digest, CanonicalBytes, ContentId};

struct Vector {
    input: serde_json::Value,
    canonical: &'static str,
    digest_hex: &'static str,
    content_id: &'static str,
}

fn document_vectors() -> Vec<Vector> {
    vec![
        Vector {
            input: serde_json::json!({}),
            canonical: "{}",
            digest_hex: "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
            content_id: "QmSvPd3sHK7iWgZuW47fyLy4CaZQe2DwxvRhrJ39VpBVMK",
        },
        Vector {
            input: serde_json::json!({"key": "value"}),
            canonical: r#"{"key":"value"}"#,
            digest_hex: "e43abcf3375244839c012f9633f95862d232a95b00d5bc7348b3098b9fed7f32",
            content_id: "QmdhZcW1ZfqqgVsHmk7HxQixd3jgxkPPxqpdSzANsbjwz1",
        },
        Vector {
            input: serde_json::json!({"b": 2, "a": 1}),
            canonical: r#"{"a":1,"b":2}"#,
            digest_hex: "43258cff783fe7036d8a43033f830adfc60ec037382473548ac742b888292777",
            content_id: "QmSrmEc5VfnNKpex35VKc7t2RYKyFxonuPMj4iiN7QjAaz",
        },
        Vector {
            input: serde_json::json!({
                "name": "Rust 101 Certificate",
                "attributes": [{"value": "A+", "trait_type": "Grade"}]
            }),
            canonical: r#"{"attributes":[{"trait_type":"Grade","value":"A+"}],"name":"Rust 101 Certificate"}"#,
            digest_hex: "029588e08c5aefec50f00f7d5f806a0f485c598a7a0d6b1023f39abb6ae2ed41",
            content_id: "QmNWjmrXPS649SoZjCiJJjCy9M8cYPgHYQY3gRvry9SYbA",
        },
        Vector {
            input: serde_json::json!({"student_name": "Zo\u{00eb}"}),
            canonical: "{\"student_name\":\"Zo\u{00eb}\"}",
            digest_hex: "ca3be60e40d454ec0648288fe9f87b6d5d0914d969b6409562b22445733e778f",
            content_id: "Qmbx63DzBLNKcochNXNvq3bqeRDaFwxoSYEpVrFVqp4T3C",
        },
    ]
}

#[test]
fn document_vectors_match() {
    for v in document_vectors() {
        let cb = CanonicalBytes::new(&v.input).expect("canonicalize");
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            v.canonical,
            "canonical form of {}",
            v.input
        );
        let digest = sha256_digest(&cb);
        assert_eq!(digest.to_hex(), v.digest_hex, "digest of {}", v.canonical);
        let id = ContentId::from_digest(&digest);
        assert_eq!(id.as_str(), v.content_id, "content id of {}", v.canonical);
    }
}

#[test]
fn identifiers_parse_back_to_their_digest() {
    for v in document_vectors() {
        let id = ContentId::parse(v.content_id).expect("valid id");
        assert_eq!(id.digest().to_hex(), v.digest_hex);
    }
}

#[test]
fn raw_byte_vectors_match() {
    let cases: [(&[u8], &str); 2] = [
        (b"", "QmdfTbBqBPQ7VNxZEYEj14VmRuZBkqFbiwReogJgS1zR1n"),
        (b"hello world", "QmaozNR7DZHQK1ZcU9p7QdrshMvXqWK6gpu5rmrkPdT3L4"),
    ];
    for (bytes, expected) in cases {
        let id = ContentId::from_digest(&sha256_bytes(bytes));
        assert_eq!(id.as_str(), expected);
    }
}
