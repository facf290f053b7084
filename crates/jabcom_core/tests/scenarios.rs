//! End-to-end datastore scenarios over the in-memory and file backends.

use jabcom_codec::{Key, KeyId, Record};
use jabcom_core::{CoreError, Dao, Datastore, EntityDao, MappingError};
use jabcom_storage::{InMemoryBackend, StorageBackend, StorageError};
use jabcom_testkit::prelude::*;
use std::sync::Arc;

#[test]
fn low_level_put_and_get() {
    let backend = InMemoryBackend::new();
    let key = Key::from_name("TestParentObject", "p1").unwrap();
    let record = Record::new(key.clone()).with("name", "first");

    assert_eq!(backend.put(record.clone()).unwrap(), key);
    assert_eq!(backend.get(&key).unwrap(), Some(record));
    assert_eq!(
        backend
            .get(&Key::from_name("TestParentObject", "p2").unwrap())
            .unwrap(),
        None
    );
}

#[test]
fn ancestor_query_returns_children_in_insertion_order() {
    let (test_store, parent, keys) = scenarios::parent_with_children(&["C1", "C2"]);

    let records = test_store
        .backend()
        .query_by_ancestor(&parent, "TestChildObject")
        .unwrap();
    let record_keys: Vec<&Key> = records.iter().map(Record::key).collect();
    assert_eq!(record_keys, keys.iter().collect::<Vec<_>>());

    let children = test_store
        .dao::<TestChildObject>()
        .fetch_by_ancestor(&parent)
        .unwrap();
    let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["C1", "C2"]);
    assert!(children.iter().all(|c| c.parent.as_ref() == Some(&parent)));
}

#[test]
fn ancestor_query_ignores_other_kinds_and_parents() {
    let (test_store, parent, _) = scenarios::parent_with_children(&["C1"]);
    let other = test_store
        .dao::<TestParentObject>()
        .save(&mut TestParentObject::named("other"))
        .unwrap();
    test_store
        .dao::<TestChildObject>()
        .save(&mut TestChildObject::below(&other, "elsewhere"))
        .unwrap();

    let children = test_store
        .dao::<TestChildObject>()
        .fetch_by_ancestor(&parent)
        .unwrap();
    assert_eq!(children.len(), 1);
    assert!(test_store
        .dao::<TestParentObject>()
        .fetch_by_ancestor(&parent)
        .unwrap()
        .is_empty());
}

fn generic_dao_operations(datastore: &Datastore) {
    let dao = datastore.dao::<TestParentObject>();
    let mut parent = TestParentObject::named("first");
    let key = dao.save(&mut parent).unwrap();
    assert_eq!(parent.key.as_ref(), Some(&key));

    let fetched = dao.fetch_by_key(&key).unwrap().unwrap();
    assert_eq!(fetched.name, "first");

    parent.name = "new name".to_string();
    assert_eq!(dao.save(&mut parent).unwrap(), key);
    let fetched = dao.fetch_by_key_str(&key.to_string()).unwrap().unwrap();
    assert_eq!(fetched.name, "new name");

    dao.delete(&key).unwrap();
    assert_eq!(dao.fetch_by_key(&key).unwrap(), None);
    dao.delete(&key).unwrap();
}

#[test]
fn generic_dao_operations_in_memory() {
    with_temp_datastore(generic_dao_operations);
}

#[test]
fn generic_dao_operations_on_file() {
    with_file_datastore(|datastore, _| generic_dao_operations(datastore));
}

fn dao_operations_with_assigned_key(datastore: &Datastore) {
    let dao = datastore.dao::<TestParentObject>();
    let k1 = Key::from_id("TestParentObject", 1).unwrap();
    let mut parent = TestParentObject {
        key: Some(k1.clone()),
        name: "first".into(),
    };
    assert_eq!(dao.save(&mut parent).unwrap(), k1);
    assert_eq!(parent.key.as_ref(), Some(&k1));
    assert_eq!(dao.fetch_by_key(&k1).unwrap().unwrap().name, "first");

    parent.name = "new name".to_string();
    assert_eq!(dao.save(&mut parent).unwrap(), k1);
    let fetched = dao.fetch_by_key_str("TestParentObject:1").unwrap().unwrap();
    assert_eq!(fetched.name, "new name");
    assert_eq!(fetched.key, Some(k1.clone()));
    assert_eq!(datastore.backend().len().unwrap(), 1);

    dao.delete_str(&k1.to_string()).unwrap();
    assert_eq!(dao.fetch_by_key(&k1).unwrap(), None);
}

#[test]
fn dao_operations_with_assigned_key_in_memory() {
    with_temp_datastore(dao_operations_with_assigned_key);
}

#[test]
fn dao_operations_with_assigned_key_on_file() {
    with_file_datastore(|datastore, _| dao_operations_with_assigned_key(datastore));
}

#[test]
fn type_without_factory_is_not_instantiable() {
    with_temp_datastore(|datastore| {
        let dao = datastore.dao::<NoFactoryObject>();
        let mut object = NoFactoryObject { key: None };
        let key = Key::from_id("NoFactoryObject", 1).unwrap();

        for err in [
            dao.save(&mut object).unwrap_err(),
            dao.fetch_by_key(&key).unwrap_err(),
            dao.delete(&key).unwrap_err(),
        ] {
            assert!(matches!(
                err,
                CoreError::Mapping(MappingError::NotInstantiable { .. })
            ));
        }
        assert_eq!(object.key, None);
        assert_eq!(datastore.backend().len().unwrap(), 0);
    });
}

#[test]
fn type_with_private_constructor_is_not_instantiable() {
    with_temp_datastore(|datastore| {
        let dao = datastore.dao::<PrivateFactoryObject>();
        let first = dao.save(&mut PrivateFactoryObject::sample()).unwrap_err();
        let second = dao.fetch_by_key_str("PrivateFactoryObject:1").unwrap_err();
        assert_eq!(first.as_mapping(), second.as_mapping());
        assert!(matches!(
            first.as_mapping(),
            Some(MappingError::NotInstantiable { .. })
        ));
    });
}

#[test]
fn entities_to_objects() {
    let (test_store, parent, keys) = scenarios::parent_with_children(&["a", "b", "c"]);
    let dao = test_store.dao::<TestChildObject>();

    let records = test_store
        .backend()
        .query_by_ancestor(&parent, "TestChildObject")
        .unwrap();
    let objects = dao.records_to_objects(records).unwrap();

    let object_keys: Vec<Key> = objects.iter().filter_map(|c| c.key.clone()).collect();
    assert_eq!(object_keys, keys);
    assert_eq!(objects[2].name, "c");
}

#[test]
fn backend_accessor_returns_shared_backend() {
    let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
    let datastore = Datastore::with_backend(backend.clone());
    let dao = datastore.dao::<TestParentObject>();

    assert!(Arc::ptr_eq(dao.backend(), &backend));
    assert!(Arc::ptr_eq(datastore.backend(), &backend));

    let key = dao.save(&mut TestParentObject::named("x")).unwrap();
    assert!(backend.get(&key).unwrap().is_some());
}

#[test]
fn dao_built_directly_sees_datastore_records() {
    with_temp_datastore(|datastore| {
        let key = datastore
            .dao::<TestParentObject>()
            .save(&mut TestParentObject::named("shared"))
            .unwrap();
        let dao = EntityDao::<TestParentObject>::new(Arc::clone(datastore.backend()));
        assert_eq!(dao.fetch_by_key(&key).unwrap().unwrap().name, "shared");
    });
}

#[test]
fn unavailable_backend_fails_then_recovers() {
    let test_store = TestDatastore::memory();
    let backend = test_store.memory_backend().unwrap().clone();
    let dao = test_store.dao::<TestParentObject>();
    let key = dao.save(&mut TestParentObject::named("before")).unwrap();

    backend.stop();
    let mut parent = TestParentObject::named("during");
    let err = dao.save(&mut parent).unwrap_err();
    assert!(matches!(err, CoreError::Storage(StorageError::Unavailable)));
    assert_eq!(parent.key, None);
    assert!(dao.fetch_by_key(&key).unwrap_err().is_unavailable());
    assert!(dao.delete(&key).unwrap_err().is_unavailable());

    backend.start();
    assert_eq!(dao.fetch_by_key(&key).unwrap().unwrap().name, "before");
    let after = dao.save(&mut parent).unwrap();
    assert_ne!(after, key);
}

#[test]
fn closed_file_store_is_unavailable() {
    let test_store = TestDatastore::file();
    let dao = test_store.dao::<TestParentObject>();
    test_store.close();

    let err = dao.save(&mut TestParentObject::named("late")).unwrap_err();
    assert!(err.is_unavailable());
}

#[test]
fn concurrent_saves_get_distinct_ids() {
    let test_store = TestDatastore::memory();
    let config = StressConfig::default();

    let result = stress_concurrent_saves(&test_store, &config);
    assert_eq!(result.failed_ops, 0);
    assert_eq!(result.successful_ops(), config.threads * config.saves_per_thread);
    assert!(result.all_keys_distinct());
}

#[test]
fn concurrent_child_saves_on_file_get_distinct_ids() {
    let test_store = TestDatastore::file();
    let parent = Key::from_name("TestParentObject", "p").unwrap();
    let config = StressConfig {
        threads: 4,
        saves_per_thread: 10,
    };

    let result = stress_concurrent_child_saves(&test_store, &parent, &config);
    assert!(result.all_keys_distinct());
    assert!(result
        .keys
        .iter()
        .all(|k| k.parent().as_ref() == Some(&parent)));

    let test_store = test_store.reopen();
    let children = test_store
        .dao::<TestChildObject>()
        .fetch_by_ancestor(&parent)
        .unwrap();
    assert_eq!(children.len(), 40);
}

#[test]
fn ids_are_not_reused_after_delete_and_reopen() {
    let test_store = TestDatastore::file();
    let dao = test_store.dao::<TestParentObject>();
    let first = dao.save(&mut TestParentObject::named("a")).unwrap();
    dao.delete(&first).unwrap();
    drop(dao);

    test_store.compact().unwrap();
    let test_store = test_store.reopen();
    let second = test_store
        .dao::<TestParentObject>()
        .save(&mut TestParentObject::named("b"))
        .unwrap();
    assert_eq!(first.id(), Some(&KeyId::Id(1)));
    assert_eq!(second.id(), Some(&KeyId::Id(2)));
}

#[test]
fn explicit_ids_are_skipped_by_allocation() {
    with_temp_datastore(|datastore| {
        let dao = datastore.dao::<TestParentObject>();
        let mut explicit = TestParentObject {
            key: Some(Key::from_id("TestParentObject", 5).unwrap()),
            name: "explicit".into(),
        };
        dao.save(&mut explicit).unwrap();

        let auto = dao.save(&mut TestParentObject::named("auto")).unwrap();
        assert_eq!(auto.id(), Some(&KeyId::Id(6)));
    });
}

#[derive(Debug, Default)]
struct TwoIdentities {
    a: Option<Key>,
    b: Option<Key>,
}

impl jabcom_core::Entity for TwoIdentities {
    fn schema() -> jabcom_core::EntitySchema<Self> {
        jabcom_core::EntitySchema::new()
            .identity("a", |o: &Self| o.a.clone(), |o, k| o.a = k)
            .identity("b", |o: &Self| o.b.clone(), |o, k| o.b = k)
            .default_factory()
    }
}

#[test]
fn multiple_identity_fields_fail_every_call() {
    with_temp_datastore(|datastore| {
        let dao = datastore.dao::<TwoIdentities>();
        for _ in 0..3 {
            let err = dao.save(&mut TwoIdentities::default()).unwrap_err();
            assert!(matches!(
                err.as_mapping(),
                Some(MappingError::MultipleIdentityFields { fields, .. }) if fields == &["a", "b"]
            ));
            assert!(dao.fetch_by_key_str("TwoIdentities:1").is_err());
        }
        assert!(datastore.backend().is_empty().unwrap());
    });
}
