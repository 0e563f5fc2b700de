use runtime_data::storage::MemoryStorage;
use runtime_data::{RuntimeData, DEFAULT_STORAGE_KEY};
use std::sync::{Arc, Mutex};
use std::thread;

#[test]
fn test_shared_access_with_mutex() {
    let storage = Arc::new(MemoryStorage::new());
    let data = Arc::new(Mutex::new(RuntimeData::with_storage(Box::new(storage.clone()))));
    data.lock().unwrap().init().unwrap();

    let mut handles = vec![];

    // Spawn 10 threads that increment the counter
    for i in 0..10 {
        let data_clone = Arc::clone(&data);
        let handle = thread::spawn(move || {
            let mut data = data_clone.lock().unwrap();
            let current = data.get_as::<i64>("counter").unwrap_or(0);
            data.set("counter", current + 1).expect("Save should succeed");

            // Also update name
            data.set("name", format!("thread-{}", i)).expect("Save should succeed");
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let data = data.lock().unwrap();
    assert_eq!(data.get_as::<i64>("counter"), Some(10));
    // Name should be from one of the threads (we can't predict which)
    assert!(data.get_as::<String>("name").unwrap().starts_with("thread-"));

    // Every set changed something, so every set was saved
    assert_eq!(storage.write_count(), 20);
    assert_eq!(storage.get(DEFAULT_STORAGE_KEY), Some(data.to_json_string().unwrap()));
}
