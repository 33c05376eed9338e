use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use super::*;
use crate::codec::{encode, encode_with, DecodeError, Decoder, EncodeError, ReferenceMode};
use crate::value::{Dictionary, Fingerprint, IndirectValue, Key, List, Value, ValueKind};

struct CountingLoader {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingLoader {
    fn new(inner: MemoryStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Loader for CountingLoader {
    fn load(&self, fingerprint: &Fingerprint) -> Result<Value, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.load(fingerprint)
    }
}

/// Offloads every member and records what it was asked to offload.
#[derive(Default)]
struct RecordingPolicy {
    store: MemoryStore,
    offloaded: Mutex<Vec<Fingerprint>>,
}

impl OffloadPolicy for RecordingPolicy {
    fn embeds(&self, _node: &IndirectValue) -> bool {
        false
    }

    fn offload(
        &self,
        node: &IndirectValue,
        _loader: Option<&dyn Loader>,
    ) -> Result<(), OffloadError> {
        let value = node.resolve()?;
        let fingerprint = self.store.insert(value)?;
        self.offloaded.lock().push(fingerprint);
        Ok(())
    }
}

struct FailingPolicy;

impl OffloadPolicy for FailingPolicy {
    fn embeds(&self, _node: &IndirectValue) -> bool {
        false
    }

    fn offload(
        &self,
        _node: &IndirectValue,
        _loader: Option<&dyn Loader>,
    ) -> Result<(), OffloadError> {
        Err(OffloadError::Storage("disk full".into()))
    }
}

fn big_binary(len: usize) -> Value {
    Value::from(vec![b'x'; len])
}

fn document() -> Value {
    Value::Dictionary(
        Dictionary::from_entries([
            (Key::from("title"), Value::from("document")),
            (
                Key::from("chunks"),
                Value::List(List::from(vec![
                    big_binary(200),
                    Value::from(1i64),
                    Value::List(List::from(vec![big_binary(150), Value::Null])),
                ])),
            ),
            (Key::from(b"raw".as_slice()), big_binary(64)),
        ])
        .unwrap(),
    )
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn test_embed_all_matches_plain_encoding() {
    let value = document();
    assert_eq!(
        encode_with(&value, &EmbedAll).unwrap(),
        encode(&value).unwrap()
    );

    let store = MemoryStore::new();
    let never = ThresholdPolicy::new(u64::MAX, store.clone());
    assert_eq!(encode_with(&value, &never).unwrap(), encode(&value).unwrap());
    assert!(store.is_empty());
}

#[test]
fn test_offloaded_binary_roundtrip() {
    let payload = vec![b'p'; 256];
    let value = Value::List(List::from(vec![Value::from(payload.clone())]));

    let store = MemoryStore::new();
    let policy = ThresholdPolicy::new(0, store.clone());
    let bytes = encode_with(&value, &policy).unwrap();

    assert!(!contains(&bytes, &payload));
    assert_eq!(bytes[0], b'l');
    assert_eq!(&bytes[1..5], b"*29:");
    assert_eq!(store.len(), 1);

    let expected = Value::from(payload).fingerprint().unwrap();
    assert_eq!(&bytes[5..34], expected.to_bytes().as_slice());

    let decoded = Decoder::new()
        .references(ReferenceMode::Eager(Arc::new(store)))
        .decode(&bytes)
        .unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_closure_loader() {
    let original = big_binary(300);
    let fingerprint = original.fingerprint().unwrap();
    let value = Value::List(List::from(vec![original.clone()]));
    let bytes = encode_with(&value, &ThresholdPolicy::new(0, MemoryStore::new())).unwrap();

    let loader = move |fp: &Fingerprint| -> Result<Value, LoadError> {
        if *fp == fingerprint {
            Ok(original.clone())
        } else {
            Err(LoadError::NotFound(fp.clone()))
        }
    };
    let decoded = Decoder::new()
        .references(ReferenceMode::Eager(Arc::new(loader)))
        .decode(&bytes)
        .unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_nested_offload_roundtrip() {
    let value = document();
    let store = MemoryStore::new();
    let policy = ThresholdPolicy::new(32, store.clone());
    let bytes = encode_with(&value, &policy).unwrap();

    assert!(bytes.len() < encode(&value).unwrap().len());
    assert!(!contains(&bytes, &[b'x'; 64]));
    // Offloaded: the chunk list, its 200-byte binary, the nested list, the
    // 150-byte binary inside that, and the raw binary. The policy measures
    // embedded encodings, so the nested list counts as large.
    assert_eq!(store.len(), 5);

    let decoded = Decoder::new()
        .references(ReferenceMode::Eager(Arc::new(store)))
        .decode(&bytes)
        .unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_offloading_is_deterministic() {
    let value = document();
    let first = encode_with(&value, &ThresholdPolicy::new(32, MemoryStore::new())).unwrap();
    let second = encode_with(&value, &ThresholdPolicy::new(32, MemoryStore::new())).unwrap();
    assert_eq!(first, second);

    let shared = ThresholdPolicy::new(32, MemoryStore::new());
    assert_eq!(encode_with(&value, &shared).unwrap(), first);
    assert_eq!(encode_with(&value, &shared).unwrap(), first);
}

#[test]
fn test_equal_members_share_one_reference() {
    let value = Value::List(List::from(vec![big_binary(100), big_binary(100)]));
    let store = MemoryStore::new();
    let bytes = encode_with(&value, &ThresholdPolicy::new(16, store.clone())).unwrap();

    assert_eq!(store.len(), 1);
    let fp = big_binary(100).fingerprint().unwrap().to_bytes();
    assert_eq!(bytes.windows(fp.len()).filter(|w| *w == fp.as_slice()).count(), 2);
}

#[test]
fn test_lazy_resolution_loads_only_what_is_used() {
    let value = document();
    let store = MemoryStore::new();
    let bytes = encode_with(&value, &ThresholdPolicy::new(32, store.clone())).unwrap();

    let loader = CountingLoader::new(store);
    let decoded = Decoder::new()
        .references(ReferenceMode::Lazy(loader.clone()))
        .decode(&bytes)
        .unwrap();
    assert_eq!(loader.calls(), 0);

    let raw = decoded.get(b"raw".as_slice()).unwrap();
    assert!(!raw.is_resolved());
    assert_eq!(raw.resolve().unwrap(), &big_binary(64));
    assert_eq!(loader.calls(), 1);

    let chunks = decoded.get("chunks").unwrap();
    assert!(!chunks.is_resolved());
    raw.resolve().unwrap();
    assert_eq!(loader.calls(), 1);
}

#[test]
fn test_reencoding_lazy_value_does_not_load() {
    let value = document();
    let store = MemoryStore::new();
    let policy = ThresholdPolicy::new(32, store.clone());
    let bytes = encode_with(&value, &policy).unwrap();

    let loader = CountingLoader::new(store);
    let decoded = Decoder::new()
        .references(ReferenceMode::Lazy(loader.clone()))
        .decode(&bytes)
        .unwrap();

    assert_eq!(encode_with(&decoded, &policy).unwrap(), bytes);
    assert_eq!(loader.calls(), 0);

    // Embedding everything has to materialize the offloaded members.
    assert_eq!(encode(&decoded).unwrap(), encode(&value).unwrap());
    assert!(loader.calls() > 0);
}

#[test]
fn test_kept_references_reencode_into_a_store_that_has_them() {
    let value = document();
    let store = MemoryStore::new();
    let policy = ThresholdPolicy::new(32, store.clone());
    let bytes = encode_with(&value, &policy).unwrap();

    let kept = Decoder::new()
        .references(ReferenceMode::Keep)
        .decode(&bytes)
        .unwrap();
    assert_eq!(encode_with(&kept, &policy).unwrap(), bytes);

    let empty = ThresholdPolicy::new(32, MemoryStore::new());
    assert!(matches!(
        encode_with(&kept, &empty),
        Err(EncodeError::Offload(OffloadError::Load(LoadError::NoLoader(_))))
    ));
}

#[test]
fn test_eager_load_failure_fails_decode() {
    let value = Value::List(List::from(vec![big_binary(100)]));
    let store = MemoryStore::new();
    let bytes = encode_with(&value, &ThresholdPolicy::new(16, store.clone())).unwrap();
    store.remove(&big_binary(100).fingerprint().unwrap()).unwrap();

    assert!(matches!(
        Decoder::new()
            .references(ReferenceMode::Eager(Arc::new(store)))
            .decode(&bytes),
        Err(DecodeError::Load(LoadError::NotFound(_)))
    ));
}

#[test]
fn test_lazy_load_failure_surfaces_on_resolve() {
    let value = Value::List(List::from(vec![big_binary(100)]));
    let store = MemoryStore::new();
    let bytes = encode_with(&value, &ThresholdPolicy::new(16, store.clone())).unwrap();
    store.remove(&big_binary(100).fingerprint().unwrap()).unwrap();

    let decoded = Decoder::new()
        .references(ReferenceMode::Lazy(Arc::new(store)))
        .decode(&bytes)
        .unwrap();
    let node = decoded.as_list().unwrap().get(0).unwrap();
    assert!(matches!(node.resolve(), Err(LoadError::NotFound(_))));
    assert!(!node.is_resolved());
}

#[test]
fn test_corrupt_store_entry() {
    let store = MemoryStore::new();
    let fp = Value::from("text").fingerprint().unwrap();
    store.put(fp.clone(), Bytes::from_static(b"u9:short"));

    assert!(matches!(store.load(&fp), Err(LoadError::Corrupt { .. })));
}

#[test]
fn test_wrong_content_store_entry_is_corrupt() {
    let store = MemoryStore::new();
    let fp = Value::from("text").fingerprint().unwrap();
    store.put(fp.clone(), Bytes::from_static(b"u4:evil"));

    assert!(matches!(
        store.load(&fp),
        Err(LoadError::Corrupt { fingerprint, .. }) if fingerprint == fp
    ));

    let node = IndirectValue::lazy(fp, Arc::new(store));
    assert!(matches!(node.resolve(), Err(LoadError::Corrupt { .. })));
    assert!(!node.is_resolved());
}

#[test]
fn test_store_entry_of_the_wrong_kind_is_corrupt() {
    let store = MemoryStore::new();
    let fp = Value::from("text").fingerprint().unwrap();
    store.put(fp.clone(), Bytes::from_static(b"i1e"));

    let node = IndirectValue::lazy(fp, Arc::new(store));
    assert!(matches!(node.resolve(), Err(LoadError::Corrupt { .. })));
}

#[test]
fn test_self_referencing_store_entry_is_corrupt() {
    let store = MemoryStore::new();
    let fp = Value::from("text").fingerprint().unwrap();
    let mut entry = b"l*29:".to_vec();
    entry.extend_from_slice(&fp.to_bytes());
    entry.push(b'e');
    store.put(fp.clone(), Bytes::from(entry));

    assert!(matches!(store.load(&fp), Err(LoadError::Corrupt { .. })));
}

#[test]
fn test_store_entries_referencing_each_other_are_corrupt() {
    let store = MemoryStore::new();
    let outer = Fingerprint::new(ValueKind::List, 100, vec![1u8; 20]);
    let inner = Fingerprint::new(ValueKind::List, 50, vec![2u8; 20]);
    for (key, target) in [(&outer, &inner), (&inner, &outer)] {
        let mut entry = b"l*29:".to_vec();
        entry.extend_from_slice(&target.to_bytes());
        entry.push(b'e');
        store.put(key.clone(), Bytes::from(entry));
    }

    assert!(matches!(
        store.load(&outer),
        Err(LoadError::Corrupt { fingerprint, .. }) if fingerprint == outer
    ));
    assert!(matches!(store.load(&inner), Err(LoadError::Corrupt { .. })));
}

#[test]
fn test_nested_store_entries_verify() {
    let value = document();
    let store = MemoryStore::new();
    encode_with(&value, &ThresholdPolicy::new(32, store.clone())).unwrap();

    let chunks = value.get("chunks").unwrap().fingerprint().unwrap();
    let loaded = store.load(&chunks).unwrap();
    assert_eq!(&loaded, value.get("chunks").unwrap().value().unwrap());
}

#[test]
fn test_encoding_length_reads_member_fingerprints() {
    let value = document();
    let store = MemoryStore::new();
    let bytes = encode_with(&value, &ThresholdPolicy::new(32, store.clone())).unwrap();

    let loader = CountingLoader::new(store);
    let decoded = Decoder::new()
        .references(ReferenceMode::Lazy(loader.clone()))
        .decode(&bytes)
        .unwrap();
    let node = IndirectValue::new(Value::List(List::from(vec![decoded])));

    let expected = encode(&Value::List(List::from(vec![value]))).unwrap().len() as u64;
    assert_eq!(node.encoding_length().unwrap(), expected);
    assert_eq!(node.encoding_length().unwrap(), expected);
    assert_eq!(loader.calls(), 0);
}

#[test]
fn test_store_put_keeps_first_write() {
    let store = MemoryStore::new();
    let fp = store.insert(&Value::from("first")).unwrap();
    assert!(!store.put(fp.clone(), Bytes::from_static(b"u6:second")));
    assert_eq!(store.load(&fp).unwrap(), Value::from("first"));
    assert!(store.contains(&fp));
    assert_eq!(store.get(&fp).unwrap(), Bytes::from_static(b"u5:first"));
}

#[test]
fn test_custom_policy_side_channel() {
    let value = Value::List(List::from(vec![
        Value::from("a"),
        Value::List(List::from(vec![Value::from(2i64)])),
    ]));
    let policy = RecordingPolicy::default();
    let bytes = encode_with(&value, &policy).unwrap();

    let offloaded = policy.offloaded.lock().clone();
    assert_eq!(
        offloaded,
        vec![
            Value::from("a").fingerprint().unwrap(),
            Value::List(List::from(vec![Value::from(2i64)]))
                .fingerprint()
                .unwrap(),
        ]
    );

    let decoded = Decoder::new()
        .references(ReferenceMode::Eager(Arc::new(policy.store.clone())))
        .decode(&bytes)
        .unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_offload_failure_fails_encode() {
    let value = Value::List(List::from(vec![Value::Null]));
    assert!(matches!(
        encode_with(&value, &FailingPolicy),
        Err(EncodeError::Offload(OffloadError::Storage(_)))
    ));
    // Top-level scalars are never offered to the policy.
    assert_eq!(encode_with(&Value::Null, &FailingPolicy).unwrap(), b"n");
}

#[test]
fn test_concurrent_encodes_share_a_policy() {
    let value = document();
    let policy = ThresholdPolicy::new(32, MemoryStore::new());
    let expected = encode_with(&value, &policy).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(encode_with(&value, &policy).unwrap(), expected);
            });
        }
    });

    let decoded = Decoder::new()
        .references(ReferenceMode::Eager(Arc::new(policy.store().clone())))
        .decode(&expected)
        .unwrap();
    assert_eq!(decoded, value);
}
