//! Property checks across the codec, the backends and the DAO layer.

use jabcom_codec::{decode_key, decode_record, encode_key, encode_record, Key, Record};
use jabcom_core::{Dao, Datastore};
use jabcom_storage::{InMemoryBackend, StorageBackend};
use jabcom_testkit::prelude::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn key_string_roundtrip(key in key_strategy()) {
        let encoded = encode_key(&key);
        prop_assert_eq!(decode_key(&encoded).unwrap(), key.clone());
        prop_assert_eq!(encoded.parse::<Key>().unwrap(), key);
    }

    #[test]
    fn record_bytes_roundtrip(record in record_strategy()) {
        let bytes = encode_record(&record).unwrap();
        prop_assert_eq!(decode_record(&bytes).unwrap(), record);
    }

    #[test]
    fn saved_entities_fetch_back_equal(
        names in prop::collection::vec(".{0,12}", 1..8),
        ranks in prop::collection::vec(prop::option::of(any::<i64>()), 8),
    ) {
        let datastore = Datastore::open_in_memory();
        let parent = datastore
            .dao::<TestParentObject>()
            .save(&mut TestParentObject::named("root"))
            .unwrap();
        let dao = datastore.dao::<TestChildObject>();

        for (name, rank) in names.iter().zip(&ranks) {
            let mut child = TestChildObject::below(&parent, name.clone());
            child.rank = *rank;
            let key = dao.save(&mut child).unwrap();
            prop_assert_eq!(dao.fetch_by_key(&key).unwrap(), Some(child));
        }
    }
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn backend_matches_ordered_model(ops in operation_sequence_strategy(1, 40)) {
        let backend = InMemoryBackend::new();
        let mut model: Vec<Record> = Vec::new();
        let mut handed_out: Vec<Key> = Vec::new();

        for op in ops {
            match op {
                RecordOperation::PutNamed { name, fields } => {
                    let key = Key::from_name("Item", name).unwrap();
                    let record = Record::from_parts(key.clone(), fields);
                    prop_assert_eq!(backend.put(record.clone()).unwrap(), key.clone());
                    match model.iter_mut().find(|r| r.key() == &key) {
                        Some(existing) => *existing = record,
                        None => model.push(record),
                    }
                }
                RecordOperation::PutAuto { fields } => {
                    let scope = Key::incomplete("Item").unwrap();
                    let key = backend.put(Record::from_parts(scope, fields.clone())).unwrap();
                    prop_assert!(!handed_out.contains(&key));
                    handed_out.push(key.clone());
                    model.push(Record::from_parts(key, fields));
                }
                RecordOperation::Remove { name } => {
                    let key = Key::from_name("Item", name).unwrap();
                    backend.remove(&key).unwrap();
                    model.retain(|r| r.key() != &key);
                }
            }
        }

        prop_assert_eq!(backend.len().unwrap(), model.len());
        prop_assert_eq!(backend.scan_kind("Item").unwrap(), model);
    }

    #[test]
    fn deleted_entities_stay_deleted(count in 1usize..10, victim in 0usize..10) {
        let datastore = Datastore::open_in_memory();
        let dao = datastore.dao::<TestParentObject>();
        let keys: Vec<Key> = (0..count)
            .map(|i| dao.save(&mut TestParentObject::named(format!("p{i}"))).unwrap())
            .collect();

        let victim = &keys[victim % count];
        dao.delete(victim).unwrap();
        dao.delete(victim).unwrap();
        prop_assert_eq!(dao.fetch_by_key(victim).unwrap(), None);
        prop_assert_eq!(dao.fetch_all().unwrap().len(), count - 1);
    }
}
